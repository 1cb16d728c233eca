use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geodata::failover::AttemptSchedule;
use crate::geodata::types::{Coordinate, InfrastructureRecord, RadiusTable, Region};
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub regions: Vec<RegionConfig>,
    pub geodata: GeodataConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub fallback_database: HashMap<String, InfrastructureRecord>,
}

impl Config {
    /// Structural validation beyond what serde enforces. Returns all errors
    /// at once, mirroring the scoring validator.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut seen = std::collections::HashSet::new();
        for (i, region) in self.regions.iter().enumerate() {
            if region.key.trim().is_empty() {
                errors.push(format!("regions[{}].key: must not be empty", i));
            }
            if !seen.insert(region.key.clone()) {
                errors.push(format!("regions[{}]: duplicate key '{}'", i, region.key));
            }
            if !(-90.0..=90.0).contains(&region.latitude) {
                errors.push(format!(
                    "regions[{}].latitude: {} is outside [-90, 90]",
                    i, region.latitude
                ));
            }
            if !(-180.0..=180.0).contains(&region.longitude) {
                errors.push(format!(
                    "regions[{}].longitude: {} is outside [-180, 180]",
                    i, region.longitude
                ));
            }
            if let Some(base) = region.base_score {
                if !base.is_finite() || base < 0.0 {
                    errors.push(format!(
                        "regions[{}].base_score: must be a non-negative number",
                        i
                    ));
                }
            }
        }

        if self.geodata.primary.trim().is_empty() {
            errors.push("geodata.primary: endpoint URL must not be empty".to_string());
        }
        if let Err(e) = self.geodata.schedule() {
            errors.push(format!("geodata: {}", e));
        }
        for (name, radius) in [
            ("highway", self.geodata.radii_km.highway),
            ("airport", self.geodata.radii_km.airport),
            ("railway", self.geodata.radii_km.railway),
            ("port", self.geodata.radii_km.port),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                errors.push(format!("geodata.radii_km.{}: must be positive", name));
            }
        }

        if self.market.window_days == 0 {
            errors.push("market.window_days: must be at least 1".to_string());
        }

        for (key, record) in &self.fallback_database {
            if record.infra_score > 100 {
                errors.push(format!(
                    "fallback_database.{}: infra_score {} exceeds 100",
                    key, record.infra_score
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Optional per-region fundamentals override.
    #[serde(default)]
    pub base_score: Option<f64>,
}

impl RegionConfig {
    pub fn to_region(&self) -> Region {
        Region {
            key: self.key.clone(),
            name: self.name.clone(),
            center: Coordinate { latitude: self.latitude, longitude: self.longitude },
            base_score: self.base_score,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeodataConfig {
    /// Primary geodata endpoint, tried first at the shorter timeout.
    pub primary: String,

    /// Mirror endpoints tried in order after the primary retry.
    #[serde(default)]
    pub mirrors: Vec<String>,

    /// Timeout for the first attempt against the primary.
    #[serde(default = "default_initial_timeout")]
    pub initial_timeout: String,

    /// Wider timeout for the primary retry and all mirror attempts.
    #[serde(default = "default_extended_timeout")]
    pub extended_timeout: String,

    /// First between-attempt delay; doubles on each later attempt.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: String,

    #[serde(default)]
    pub radii_km: RadiusTable,
}

fn default_initial_timeout() -> String {
    "10s".to_string()
}

fn default_extended_timeout() -> String {
    "25s".to_string()
}

fn default_backoff_base() -> String {
    "500ms".to_string()
}

impl GeodataConfig {
    /// Parse the duration strings and build the concrete attempt schedule.
    pub fn schedule(&self) -> Result<AttemptSchedule> {
        let initial = parse_config_duration("initial_timeout", &self.initial_timeout)?;
        let extended = parse_config_duration("extended_timeout", &self.extended_timeout)?;
        let backoff = parse_config_duration("backoff_base", &self.backoff_base)?;
        if extended <= initial {
            anyhow::bail!(
                "extended_timeout ({}) must exceed initial_timeout ({})",
                self.extended_timeout,
                self.initial_timeout
            );
        }
        Ok(AttemptSchedule::build(
            &self.primary,
            &self.mirrors,
            initial,
            extended,
            backoff,
        ))
    }
}

fn parse_config_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .with_context(|| format!("{}: invalid duration '{}'", field, value))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Price-intelligence endpoint; when absent, `static_trends` is used.
    pub endpoint: Option<String>,

    /// Trailing window for the trend percentage.
    pub window_days: u32,

    /// Per-region trend percentages for offline operation.
    pub static_trends: HashMap<String, f64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self { endpoint: None, window_days: 90, static_trends: HashMap::new() }
    }
}
