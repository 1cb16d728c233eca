use super::bands::Classification;
use super::config::ScoringConfig;

#[derive(Debug, Clone)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Infrastructure", "Market"
    pub description: String, // e.g. "infra score 75 -> x1.15"
    pub before: f64,         // Score before this factor
    pub after: f64,          // Score after this factor
}

#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub final_score: f64,
    pub classification: Classification,
    pub breakdown: ScoreBreakdown,
}

/// Per-region scoring input, constructed per scoring run and discarded
/// afterwards. `infra_score` is None when the signal is missing and the
/// neutral policy is in effect.
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub region_key: String,
    pub base_score: f64,
    pub infra_score: Option<u8>,
    pub market_trend_pct: f64,
}

/// Multiplicative tiered scoring: a linear weighted sum compresses the
/// distribution, while compounding multipliers keep genuinely excellent
/// regions separated from merely good ones.
pub fn calculate_score(input: &ScoringInput, config: &ScoringConfig) -> ScoreResult {
    let base_score = input.base_score;
    let mut score = base_score;
    let mut factors = Vec::new();

    let (infra_multiplier, description) = match input.infra_score {
        Some(infra) => {
            let multiplier = config.infrastructure_tiers.multiplier_for(f64::from(infra));
            (multiplier, format!("infra score {} -> x{:.2}", infra, multiplier))
        }
        None => (1.0, "no infrastructure signal -> neutral x1.00".to_string()),
    };
    let before = score;
    score *= infra_multiplier;
    factors.push(FactorContribution {
        label: "Infrastructure".to_string(),
        description,
        before,
        after: score,
    });

    let market_multiplier = config.market_tiers.multiplier_for(input.market_trend_pct);
    let before = score;
    score *= market_multiplier;
    factors.push(FactorContribution {
        label: "Market".to_string(),
        description: format!(
            "trend {:+.1}% -> x{:.2}",
            input.market_trend_pct, market_multiplier
        ),
        before,
        after: score,
    });

    // Floor at zero
    let final_score = score.max(0.0);
    ScoreResult {
        final_score,
        classification: config.thresholds.classify(final_score),
        breakdown: ScoreBreakdown { base_score, factors },
    }
}
