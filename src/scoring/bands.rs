use std::fmt;

use serde::{Deserialize, Serialize};

/// One tier: everything at or above `min` (and below any higher band's
/// `min`) maps to `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Band {
    pub min: f64,
    pub multiplier: f64,
}

/// Ordered lower-bound band table. Lookup picks the band with the highest
/// `min` that is still <= the value; `below` catches everything under the
/// lowest bound, so the table is total over the reals by construction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierTable {
    pub bands: Vec<Band>,
    pub below: f64,
}

impl TierTable {
    pub fn infrastructure_default() -> Self {
        Self {
            bands: vec![
                Band { min: 90.0, multiplier: 1.30 },
                Band { min: 75.0, multiplier: 1.15 },
                Band { min: 60.0, multiplier: 1.00 },
                Band { min: 40.0, multiplier: 0.90 },
            ],
            below: 0.80,
        }
    }

    pub fn market_default() -> Self {
        Self {
            bands: vec![
                Band { min: 15.0, multiplier: 1.40 },
                Band { min: 8.0, multiplier: 1.20 },
                Band { min: 2.0, multiplier: 1.00 },
                Band { min: 0.0, multiplier: 0.95 },
            ],
            below: 0.85,
        }
    }

    /// Total lookup: exactly one multiplier for every real value.
    pub fn multiplier_for(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .filter(|band| value >= band.min)
            .max_by(|a, b| a.min.partial_cmp(&b.min).unwrap_or(std::cmp::Ordering::Equal))
            .map(|band| band.multiplier)
            .unwrap_or(self.below)
    }
}

/// Three-way classification of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Buy,
    Watch,
    Pass,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Buy => "BUY",
            Classification::Watch => "WATCH",
            Classification::Pass => "PASS",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification cut points: BUY at or above `buy`, WATCH at or above
/// `watch`, PASS below. Closed on the lower end so no score falls between
/// bands.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationThresholds {
    pub buy: f64,
    pub watch: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self { buy: 40.0, watch: 25.0 }
    }
}

impl ClassificationThresholds {
    pub fn classify(&self, final_score: f64) -> Classification {
        if final_score >= self.buy {
            Classification::Buy
        } else if final_score >= self.watch {
            Classification::Watch
        } else {
            Classification::Pass
        }
    }
}
