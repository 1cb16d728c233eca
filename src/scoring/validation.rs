use super::bands::TierTable;
use super::config::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// A band table that passes here is total and disjoint over its domain, so
/// a score falling outside every band cannot occur at scoring time.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !config.base_score.is_finite() || config.base_score < 0.0 {
        errors.push("scoring.base_score: must be a non-negative number".to_string());
    }

    validate_tier_table(
        &config.infrastructure_tiers,
        "scoring.infrastructure_tiers",
        &mut errors,
    );
    validate_tier_table(&config.market_tiers, "scoring.market_tiers", &mut errors);

    if !config.thresholds.buy.is_finite() || !config.thresholds.watch.is_finite() {
        errors.push("scoring.thresholds: buy and watch must be numbers".to_string());
    } else {
        if config.thresholds.watch < 0.0 {
            errors.push("scoring.thresholds.watch: must be non-negative".to_string());
        }
        if config.thresholds.buy <= config.thresholds.watch {
            errors.push(format!(
                "scoring.thresholds: buy ({}) must exceed watch ({})",
                config.thresholds.buy, config.thresholds.watch
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_tier_table(table: &TierTable, prefix: &str, errors: &mut Vec<String>) {
    if table.bands.is_empty() {
        errors.push(format!("{}: at least one band is required", prefix));
    }

    for (i, band) in table.bands.iter().enumerate() {
        if !band.min.is_finite() {
            errors.push(format!("{}.bands[{}].min: must be a number", prefix, i));
        }
        if !band.multiplier.is_finite() || band.multiplier <= 0.0 {
            errors.push(format!("{}.bands[{}].multiplier: must be positive", prefix, i));
        }
    }

    // Two bands sharing a lower bound would overlap.
    for (i, a) in table.bands.iter().enumerate() {
        for (j, b) in table.bands.iter().enumerate().skip(i + 1) {
            if a.min == b.min {
                errors.push(format!(
                    "{}: bands[{}] and bands[{}] share lower bound {}",
                    prefix, i, j, a.min
                ));
            }
        }
    }

    if !table.below.is_finite() || table.below <= 0.0 {
        errors.push(format!("{}.below: must be positive", prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::bands::{Band, ClassificationThresholds};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_base_score() {
        let config = ScoringConfig { base_score: -10.0, ..ScoringConfig::default() };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("base_score"));
    }

    #[test]
    fn test_empty_band_table() {
        let config = ScoringConfig {
            infrastructure_tiers: TierTable { bands: vec![], below: 0.8 },
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.infrastructure_tiers"));
    }

    #[test]
    fn test_duplicate_lower_bounds_are_rejected() {
        let config = ScoringConfig {
            market_tiers: TierTable {
                bands: vec![
                    Band { min: 8.0, multiplier: 1.2 },
                    Band { min: 8.0, multiplier: 1.0 },
                ],
                below: 0.85,
            },
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("share lower bound"));
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let config = ScoringConfig {
            infrastructure_tiers: TierTable {
                bands: vec![Band { min: 50.0, multiplier: 0.0 }],
                below: 0.8,
            },
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("multiplier")));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = ScoringConfig {
            thresholds: ClassificationThresholds { buy: 25.0, watch: 40.0 },
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("must exceed watch"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScoringConfig {
            base_score: -1.0, // Error 1
            thresholds: ClassificationThresholds { buy: 10.0, watch: 10.0 }, // Error 2
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
