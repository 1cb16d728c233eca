use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::debug;

use crate::geodata::types::Region;

/// Market-signal collaborator: one trailing-window price-trend percentage
/// per region. The engine consumes the number and nothing else.
#[async_trait]
pub trait PriceIntelligence: Send + Sync {
    async fn market_trend(&self, region: &Region) -> Result<f64>;
}

/// Fetches trends from a price-intelligence HTTP endpoint.
pub struct HttpPriceIntelligence {
    http: reqwest::Client,
    endpoint: String,
    window_days: u32,
}

impl HttpPriceIntelligence {
    pub fn new(endpoint: String, window_days: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("terrascout")
            .build()
            .context("Failed to create market HTTP client")?;
        Ok(Self { http, endpoint, window_days })
    }
}

#[async_trait]
impl PriceIntelligence for HttpPriceIntelligence {
    async fn market_trend(&self, region: &Region) -> Result<f64> {
        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(std::time::Duration::from_secs(5))
            .take(3);

        let url = format!(
            "{}/regions/{}/trend",
            self.endpoint.trim_end_matches('/'),
            region.key
        );

        let payload = Retry::spawn(retry_strategy, || async {
            let response = self
                .http
                .get(&url)
                .query(&[("window_days", self.window_days.to_string())])
                .send()
                .await
                .with_context(|| format!("Failed to fetch market trend for {}", region.key))?;

            if !response.status().is_success() {
                anyhow::bail!(
                    "Market trend request for {} returned status {}",
                    region.key,
                    response.status()
                );
            }

            response
                .json::<Value>()
                .await
                .with_context(|| format!("Failed to parse market trend JSON for {}", region.key))
        })
        .await?;

        let trend = parse_trend(&payload)
            .ok_or_else(|| anyhow!("Unrecognized market trend payload for {}", region.key))?;
        debug!("region '{}': market trend {:+.1}%", region.key, trend);
        Ok(trend)
    }
}

fn parse_trend(payload: &Value) -> Option<f64> {
    match payload {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map
            .get("trend_pct")
            .or_else(|| map.get("trend"))
            .and_then(Value::as_f64),
        _ => None,
    }
}

/// Config-driven trend table for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTrendTable {
    trends: HashMap<String, f64>,
}

impl StaticTrendTable {
    pub fn new(trends: HashMap<String, f64>) -> Self {
        Self { trends }
    }
}

#[async_trait]
impl PriceIntelligence for StaticTrendTable {
    async fn market_trend(&self, region: &Region) -> Result<f64> {
        self.trends
            .get(&region.key)
            .copied()
            .ok_or_else(|| anyhow!("No market trend configured for region '{}'", region.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodata::types::Coordinate;

    fn test_region(key: &str) -> Region {
        Region {
            key: key.to_string(),
            name: None,
            center: Coordinate { latitude: 0.0, longitude: 0.0 },
            base_score: None,
        }
    }

    #[test]
    fn test_parse_trend_accepts_object_fields_and_bare_numbers() {
        assert_eq!(parse_trend(&serde_json::json!({ "trend_pct": 8.5 })), Some(8.5));
        assert_eq!(parse_trend(&serde_json::json!({ "trend": -2.0 })), Some(-2.0));
        assert_eq!(parse_trend(&serde_json::json!(12.25)), Some(12.25));
    }

    #[test]
    fn test_parse_trend_rejects_unknown_shapes() {
        assert_eq!(parse_trend(&serde_json::json!({ "pct": 8.5 })), None);
        assert_eq!(parse_trend(&serde_json::json!("up")), None);
        assert_eq!(parse_trend(&serde_json::json!([1.0, 2.0])), None);
    }

    #[tokio::test]
    async fn test_static_table_returns_configured_trend() {
        let mut trends = HashMap::new();
        trends.insert("austin-tx".to_string(), 12.5);
        let table = StaticTrendTable::new(trends);

        let trend = table.market_trend(&test_region("austin-tx")).await.unwrap();
        assert_eq!(trend, 12.5);
    }

    #[tokio::test]
    async fn test_static_table_errors_on_unknown_region() {
        let table = StaticTrendTable::default();
        let err = table.market_trend(&test_region("nowhere-xx")).await.unwrap_err();
        assert!(err.to_string().contains("nowhere-xx"));
    }
}
