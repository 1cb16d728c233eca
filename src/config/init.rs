use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::geodata::fallback::default_entries;
use crate::scoring::ScoringConfig;

use super::schema::{Config, GeodataConfig, MarketConfig, RegionConfig};
use super::{ensure_config_dir, get_config_path};

const HEADER: &str = "\
# terrascout configuration
#
# regions:           areas to score (key, center coordinate, optional
#                    per-region base_score override)
# geodata:           proximity service endpoints, attempt timeouts/backoff,
#                    and per-feature search radii
# market:            price-trend source; static_trends serves offline runs
# scoring:           multiplier band tables and BUY/WATCH thresholds
# fallback_database: static infrastructure records used when every live
#                    query for a region fails
";

/// Sample configuration seeded with the built-in fallback table. Everything
/// in it is meant to be edited.
fn sample_config() -> Config {
    let regions = vec![
        RegionConfig {
            key: "austin-tx".to_string(),
            name: Some("Austin, TX".to_string()),
            latitude: 30.27,
            longitude: -97.74,
            base_score: None,
        },
        RegionConfig {
            key: "denver-co".to_string(),
            name: Some("Denver, CO".to_string()),
            latitude: 39.74,
            longitude: -104.99,
            base_score: None,
        },
        RegionConfig {
            key: "houston-tx".to_string(),
            name: Some("Houston, TX".to_string()),
            latitude: 29.76,
            longitude: -95.37,
            base_score: Some(55.0),
        },
        RegionConfig {
            key: "boise-id".to_string(),
            name: Some("Boise, ID".to_string()),
            latitude: 43.62,
            longitude: -116.21,
            base_score: None,
        },
    ];

    let static_trends = [
        ("austin-tx", 12.5),
        ("denver-co", 6.0),
        ("houston-tx", 3.5),
        ("boise-id", -1.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    Config {
        regions,
        geodata: GeodataConfig {
            primary: "https://geodata.example.com/api".to_string(),
            mirrors: vec![
                "https://mirror-a.geodata.example.com/api".to_string(),
                "https://mirror-b.geodata.example.com/api".to_string(),
            ],
            initial_timeout: "10s".to_string(),
            extended_timeout: "25s".to_string(),
            backoff_base: "500ms".to_string(),
            radii_km: Default::default(),
        },
        market: MarketConfig { endpoint: None, window_days: 90, static_trends },
        scoring: Some(ScoringConfig::default()),
        fallback_database: default_entries(),
    }
}

/// Write a default config file and return its path.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => {
            ensure_config_dir()?;
            get_config_path()
        }
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    let body = serde_saphyr::to_string(&sample_config())
        .context("Failed to serialize default config")?;
    fs::write(&config_path, format!("{}\n{}", HEADER, body))
        .with_context(|| format!("Failed to write config file at {}", config_path.display()))?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::validate_scoring;

    #[test]
    fn test_sample_config_is_valid() {
        let config = sample_config();
        assert!(config.validate().is_ok());
        assert!(validate_scoring(config.scoring.as_ref().unwrap()).is_ok());
    }

    #[test]
    fn test_sample_config_round_trips_through_yaml() {
        let config = sample_config();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();

        assert_eq!(parsed.regions.len(), config.regions.len());
        assert_eq!(parsed.geodata.mirrors.len(), 2);
        assert_eq!(parsed.fallback_database.len(), config.fallback_database.len());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_sample_regions_have_fallback_coverage() {
        // Every seeded region has both a fallback record and a static trend,
        // so a fresh config works with no network at all.
        let config = sample_config();
        for region in &config.regions {
            assert!(config.fallback_database.contains_key(&region.key), "{}", region.key);
            assert!(config.market.static_trends.contains_key(&region.key), "{}", region.key);
        }
    }
}
