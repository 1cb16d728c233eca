use serde::{Deserialize, Serialize};

use super::bands::{ClassificationThresholds, TierTable};

/// Main scoring configuration.
///
/// Defines how region scores are calculated: a base fundamentals score,
/// multiplied by an infrastructure-tier multiplier and a market-tier
/// multiplier, then partitioned by the classification thresholds.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   base_score: 50
///   thresholds: { buy: 40, watch: 25 }
///   infrastructure_tiers:
///     bands:
///       - { min: 90, multiplier: 1.30 }
///       - { min: 75, multiplier: 1.15 }
///     below: 0.80
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Base fundamentals score before multipliers are applied.
    pub base_score: f64,

    /// Infrastructure-score bands over [0, 100].
    pub infrastructure_tiers: TierTable,

    /// Market-trend bands over all of the reals.
    pub market_tiers: TierTable,

    /// BUY / WATCH cut points; everything below `watch` is PASS.
    pub thresholds: ClassificationThresholds,

    /// What to do with a region whose infrastructure score is missing.
    pub on_missing_infrastructure: MissingInfraPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 50.0,
            infrastructure_tiers: TierTable::infrastructure_default(),
            market_tiers: TierTable::market_default(),
            thresholds: ClassificationThresholds::default(),
            on_missing_infrastructure: MissingInfraPolicy::default(),
        }
    }
}

/// Handling for regions with no live geodata and no fallback entry: skip
/// them (reported by name) or score them with a neutral 1.00 infrastructure
/// multiplier. Never a silent zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingInfraPolicy {
    #[default]
    Skip,
    Neutral,
}
