use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AttemptError, ProximityError};

use super::failover::AttemptSchedule;
use super::types::ProximityQuery;

/// Seam between the failover logic and the wire. One call = one attempt
/// against one endpoint with one timeout.
#[async_trait]
pub trait ProximityTransport: Send + Sync {
    async fn fetch_count(
        &self,
        endpoint: &str,
        query: &ProximityQuery,
        timeout: Duration,
    ) -> Result<u64, AttemptError>;
}

/// HTTP transport against the geodata service's feature-count endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("terrascout")
            .build()
            .context("Failed to create geodata HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ProximityTransport for HttpTransport {
    async fn fetch_count(
        &self,
        endpoint: &str,
        query: &ProximityQuery,
        timeout: Duration,
    ) -> Result<u64, AttemptError> {
        let url = format!("{}/features/count", endpoint.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", query.center.latitude.to_string()),
                ("lon", query.center.longitude.to_string()),
                ("radius_km", query.radius_km.to_string()),
                ("feature", query.feature.wire_name().to_string()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        if !response.status().is_success() {
            return Err(AttemptError::Status(response.status().as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        parse_count(&payload)
    }
}

fn classify_reqwest_error(error: reqwest::Error, timeout: Duration) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Timeout(timeout)
    } else if error.is_decode() {
        AttemptError::Malformed(error.to_string())
    } else {
        AttemptError::Network(error)
    }
}

/// Extract a feature count from whatever shape the service returned. The
/// wire format is owned by the service; anything unrecognized is an attempt
/// failure, never a crash.
fn parse_count(payload: &Value) -> Result<u64, AttemptError> {
    if let Some(count) = payload.get("count").and_then(Value::as_u64) {
        return Ok(count);
    }
    if let Some(elements) = payload.get("elements").and_then(Value::as_array) {
        return Ok(elements.len() as u64);
    }
    let mut snippet = payload.to_string();
    snippet.truncate(120);
    Err(AttemptError::Malformed(snippet))
}

/// Walks the attempt schedule for each query: back off, attempt, and on any
/// failure advance to the next (endpoint, timeout) pair. The first success
/// short-circuits; a query fails only after the whole schedule is exhausted.
pub struct ProximityClient<T> {
    transport: T,
    schedule: AttemptSchedule,
}

impl<T: ProximityTransport> ProximityClient<T> {
    pub fn new(transport: T, schedule: AttemptSchedule) -> Self {
        Self { transport, schedule }
    }

    pub async fn count_features(&self, query: &ProximityQuery) -> Result<u64, ProximityError> {
        let total = self.schedule.len();
        let mut last: Option<AttemptError> = None;

        for (attempt, plan) in self.schedule.attempts().iter().enumerate() {
            if !plan.delay.is_zero() {
                tokio::time::sleep(plan.delay).await;
            }
            match self
                .transport
                .fetch_count(&plan.endpoint, query, plan.timeout)
                .await
            {
                Ok(count) => {
                    debug!(
                        "{} query satisfied by {} on attempt {}/{}: {} features",
                        query.feature,
                        plan.endpoint,
                        attempt + 1,
                        total,
                        count
                    );
                    return Ok(count);
                }
                Err(e) => {
                    warn!(
                        "{} query attempt {}/{} against {} failed: {}",
                        query.feature,
                        attempt + 1,
                        total,
                        plan.endpoint,
                        e
                    );
                    last = Some(e);
                }
            }
        }

        Err(ProximityError::Exhausted {
            feature: query.feature,
            attempts: total,
            last: last.unwrap_or_else(|| AttemptError::Malformed("no attempts configured".to_string())),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedTransport};
    use super::*;
    use crate::geodata::types::{Coordinate, FeatureKind};

    fn zero_delay_schedule(mirrors: &[String]) -> AttemptSchedule {
        AttemptSchedule::build(
            "https://primary.test",
            mirrors,
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::ZERO,
        )
    }

    fn sample_query() -> ProximityQuery {
        ProximityQuery {
            center: Coordinate { latitude: 30.27, longitude: -97.74 },
            feature: FeatureKind::Highway,
            radius_km: 50.0,
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let transport = ScriptedTransport::always(Scripted::Count(7));
        let client = ProximityClient::new(
            transport,
            zero_delay_schedule(&["https://mirror-a.test".to_string()]),
        );

        let count = client.count_features(&sample_query()).await.unwrap();
        assert_eq!(count, 7);
        assert_eq!(client.transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failover_reaches_mirror_after_primary_failures() {
        // Primary always fails, mirror always succeeds: the mirror's count
        // comes back after exactly the two failed primary attempts.
        let transport = ScriptedTransport::always(Scripted::Count(12))
            .endpoint("https://primary.test", Scripted::Fail);
        let client = ProximityClient::new(
            transport,
            zero_delay_schedule(&["https://mirror-a.test".to_string()]),
        );

        let count = client.count_features(&sample_query()).await.unwrap();
        assert_eq!(count, 12);

        let calls = client.transport.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "https://primary.test".to_string(),
                "https://primary.test".to_string(),
                "https://mirror-a.test".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausts_every_attempt_before_failing() {
        let transport = ScriptedTransport::always(Scripted::Fail);
        let client = ProximityClient::new(
            transport,
            zero_delay_schedule(&[
                "https://mirror-a.test".to_string(),
                "https://mirror-b.test".to_string(),
            ]),
        );

        let err = client.count_features(&sample_query()).await.unwrap_err();
        let ProximityError::Exhausted { feature, attempts, .. } = err;
        assert_eq!(feature, FeatureKind::Highway);
        assert_eq!(attempts, 4);
        assert_eq!(client.transport.call_count(), 4);
    }

    #[test]
    fn test_parse_count_accepts_count_field() {
        let payload = serde_json::json!({ "count": 42 });
        assert_eq!(parse_count(&payload).unwrap(), 42);
    }

    #[test]
    fn test_parse_count_accepts_element_list() {
        let payload = serde_json::json!({ "elements": [{"id": 1}, {"id": 2}, {"id": 3}] });
        assert_eq!(parse_count(&payload).unwrap(), 3);
    }

    #[test]
    fn test_parse_count_rejects_unknown_shapes() {
        for payload in [
            serde_json::json!({ "total": 9 }),
            serde_json::json!("not an object"),
            serde_json::json!({ "count": "twelve" }),
        ] {
            assert!(matches!(
                parse_count(&payload),
                Err(AttemptError::Malformed(_))
            ));
        }
    }
}
