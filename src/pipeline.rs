use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::analyzer::{InfraAssessment, InfrastructureAnalyzer};
use crate::error::AnalyzeError;
use crate::geodata::client::ProximityTransport;
use crate::geodata::types::Region;
use crate::market::PriceIntelligence;
use crate::scoring::{
    calculate_score, Classification, MissingInfraPolicy, ScoreResult, ScoringConfig, ScoringInput,
};

#[derive(Debug, Clone)]
pub struct ScoredRegion {
    pub region: Region,
    pub result: ScoreResult,
    /// None when the region was scored under the neutral missing-signal
    /// policy and no record exists.
    pub infrastructure: Option<InfraAssessment>,
    pub market_trend_pct: f64,
}

#[derive(Debug, Clone)]
pub struct UnscoredRegion {
    pub region: Region,
    pub reason: String,
}

/// Full output of one batch pass. Every scored region appears in exactly one
/// of the three lists; regions that could not be scored are reported by name
/// in `unscored`, never dropped silently.
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub buy_recommendations: Vec<ScoredRegion>,
    pub watch_list: Vec<ScoredRegion>,
    pub pass_list: Vec<ScoredRegion>,
    pub unscored: Vec<UnscoredRegion>,
    pub regions_analyzed: Vec<String>,
}

impl PortfolioReport {
    pub fn scored_len(&self) -> usize {
        self.buy_recommendations.len() + self.watch_list.len() + self.pass_list.len()
    }

    /// Partition totality: |BUY| + |WATCH| + |PASS| = |regions analyzed|.
    pub fn is_complete_partition(&self) -> bool {
        self.scored_len() == self.regions_analyzed.len()
    }
}

/// Run one scoring pass over the region set. Regions are processed
/// sequentially; within a region the infrastructure and market signals are
/// gathered concurrently, and neither result counts until both are in.
pub async fn score_regions<T: ProximityTransport>(
    analyzer: &InfrastructureAnalyzer<T>,
    market: &dyn PriceIntelligence,
    scoring: &ScoringConfig,
    regions: &[Region],
) -> PortfolioReport {
    let mut buy_recommendations = Vec::new();
    let mut watch_list = Vec::new();
    let mut pass_list = Vec::new();
    let mut unscored = Vec::new();
    let mut regions_analyzed = Vec::new();

    // Deduplicate by key (a region listed twice must not be scored twice)
    let mut seen_keys = HashSet::new();

    for region in regions {
        if !seen_keys.insert(region.key.clone()) {
            debug!("region '{}' listed more than once, skipping duplicate", region.key);
            continue;
        }

        let (infra, trend) = tokio::join!(
            analyzer.analyze(region),
            market.market_trend(region)
        );

        let trend = match trend {
            Ok(t) => t,
            Err(e) => {
                warn!("region '{}': market trend unavailable: {}", region.key, e);
                unscored.push(UnscoredRegion {
                    region: region.clone(),
                    reason: format!("market trend unavailable: {}", e),
                });
                continue;
            }
        };

        let infrastructure = match infra {
            Ok(assessment) => Some(assessment),
            Err(AnalyzeError::ScoreMissing { .. }) => {
                match scoring.on_missing_infrastructure {
                    MissingInfraPolicy::Skip => {
                        warn!(
                            "region '{}': infrastructure score missing, skipping per policy",
                            region.key
                        );
                        unscored.push(UnscoredRegion {
                            region: region.clone(),
                            reason: "infrastructure score missing".to_string(),
                        });
                        continue;
                    }
                    MissingInfraPolicy::Neutral => {
                        warn!(
                            "region '{}': infrastructure score missing, applying neutral multiplier per policy",
                            region.key
                        );
                        None
                    }
                }
            }
        };

        let input = ScoringInput {
            region_key: region.key.clone(),
            base_score: region.base_score.unwrap_or(scoring.base_score),
            infra_score: infrastructure.map(|a| a.record.infra_score),
            market_trend_pct: trend,
        };
        let result = calculate_score(&input, scoring);
        regions_analyzed.push(region.key.clone());

        let scored = ScoredRegion {
            region: region.clone(),
            result,
            infrastructure,
            market_trend_pct: trend,
        };
        match scored.result.classification {
            Classification::Buy => buy_recommendations.push(scored),
            Classification::Watch => watch_list.push(scored),
            Classification::Pass => pass_list.push(scored),
        }
    }

    // Sort each list by score descending, then by key ascending for ties
    let sort_fn = |a: &ScoredRegion, b: &ScoredRegion| {
        let score_cmp = b
            .result
            .final_score
            .partial_cmp(&a.result.final_score)
            .unwrap_or(std::cmp::Ordering::Equal);
        if score_cmp != std::cmp::Ordering::Equal {
            return score_cmp;
        }
        a.region.key.cmp(&b.region.key)
    };
    buy_recommendations.sort_by(sort_fn);
    watch_list.sort_by(sort_fn);
    pass_list.sort_by(sort_fn);

    let report = PortfolioReport {
        generated_at: Utc::now(),
        buy_recommendations,
        watch_list,
        pass_list,
        unscored,
        regions_analyzed,
    };
    debug_assert!(report.is_complete_partition());
    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::analyzer::InfraSource;
    use crate::geodata::client::testing::{Scripted, ScriptedTransport};
    use crate::geodata::client::ProximityClient;
    use crate::geodata::failover::AttemptSchedule;
    use crate::geodata::fallback::RegionalInfrastructureDatabase;
    use crate::geodata::types::{Coordinate, RadiusTable};
    use crate::market::StaticTrendTable;

    fn test_region(key: &str) -> Region {
        Region {
            key: key.to_string(),
            name: None,
            center: Coordinate { latitude: 0.0, longitude: 0.0 },
            base_score: None,
        }
    }

    fn analyzer_with(
        transport: ScriptedTransport,
        fallback: RegionalInfrastructureDatabase,
    ) -> InfrastructureAnalyzer<ScriptedTransport> {
        let schedule = AttemptSchedule::build(
            "https://primary.test",
            &[],
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::ZERO,
        );
        InfrastructureAnalyzer::new(
            ProximityClient::new(transport, schedule),
            fallback,
            RadiusTable::default(),
        )
    }

    fn trends(entries: &[(&str, f64)]) -> StaticTrendTable {
        StaticTrendTable::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn test_partition_is_total_over_mixed_outcomes() {
        // Ten features everywhere -> infra score 83 -> x1.15 multiplier.
        let transport = ScriptedTransport::always(Scripted::Count(10));
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[
            ("hot-metro", 18.0),   // 50 * 1.15 * 1.40 = 80.5   -> BUY
            ("steady-town", 5.0),  // 50 * 1.15 * 1.00 = 57.5   -> WATCH
            ("slow-burb", -3.0),   // 50 * 1.15 * 0.85 = 48.875 -> PASS
        ]);
        let scoring = ScoringConfig {
            thresholds: crate::scoring::ClassificationThresholds { buy: 60.0, watch: 50.0 },
            ..ScoringConfig::default()
        };
        let regions = vec![
            test_region("hot-metro"),
            test_region("steady-town"),
            test_region("slow-burb"),
            test_region("no-trend-data"),
        ];

        let report = score_regions(&analyzer, &market, &scoring, &regions).await;

        assert!(report.is_complete_partition());
        assert_eq!(report.regions_analyzed.len(), 3);
        assert_eq!(report.buy_recommendations.len(), 1);
        assert_eq!(report.watch_list.len(), 1);
        assert_eq!(report.pass_list.len(), 1);
        assert_eq!(report.unscored.len(), 1);
        assert_eq!(report.unscored[0].region.key, "no-trend-data");
        assert!(report.unscored[0].reason.contains("market trend"));
    }

    #[tokio::test]
    async fn test_missing_infra_skip_policy_reports_region() {
        let transport = ScriptedTransport::always(Scripted::Fail);
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[("ghost-town", 3.0)]);
        let scoring = ScoringConfig::default(); // policy: skip

        let report =
            score_regions(&analyzer, &market, &scoring, &[test_region("ghost-town")]).await;

        assert_eq!(report.scored_len(), 0);
        assert_eq!(report.unscored.len(), 1);
        assert_eq!(report.unscored[0].reason, "infrastructure score missing");
        assert!(report.is_complete_partition());
    }

    #[tokio::test]
    async fn test_missing_infra_neutral_policy_still_scores() {
        let transport = ScriptedTransport::always(Scripted::Fail);
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[("ghost-town", 5.0)]);
        let scoring = ScoringConfig {
            on_missing_infrastructure: MissingInfraPolicy::Neutral,
            ..ScoringConfig::default()
        };

        let report =
            score_regions(&analyzer, &market, &scoring, &[test_region("ghost-town")]).await;

        assert_eq!(report.scored_len(), 1);
        assert!(report.unscored.is_empty());
        // 50 * 1.00 (neutral) * 1.00 = 50 -> BUY at 40/25.
        let scored = &report.buy_recommendations[0];
        assert!((scored.result.final_score - 50.0).abs() < 1e-9);
        assert!(scored.infrastructure.is_none());
    }

    #[tokio::test]
    async fn test_fallback_region_is_scored_from_database() {
        let mut records = HashMap::new();
        records.insert(
            "austin-tx".to_string(),
            crate::geodata::types::InfrastructureRecord {
                infra_score: 76,
                highways: 14,
                airports: 2,
                railways: 8,
                ports: 0,
            },
        );
        let transport = ScriptedTransport::always(Scripted::Fail);
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::new(records));
        let market = trends(&[("austin-tx", 9.0)]);
        let scoring = ScoringConfig::default();

        let report =
            score_regions(&analyzer, &market, &scoring, &[test_region("austin-tx")]).await;

        assert_eq!(report.scored_len(), 1);
        let scored = &report.buy_recommendations[0];
        assert_eq!(
            scored.infrastructure.unwrap().source,
            InfraSource::Fallback
        );
        // 50 * 1.15 (76 -> [75,90)) * 1.20 (9 -> [8,15)) = 69.0
        assert!((scored.result.final_score - 69.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_duplicate_regions_scored_once() {
        let transport = ScriptedTransport::always(Scripted::Count(10));
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[("twin-city", 5.0)]);
        let scoring = ScoringConfig::default();
        let regions = vec![test_region("twin-city"), test_region("twin-city")];

        let report = score_regions(&analyzer, &market, &scoring, &regions).await;

        assert_eq!(report.regions_analyzed.len(), 1);
        assert!(report.is_complete_partition());
    }

    #[tokio::test]
    async fn test_lists_sorted_by_score_descending() {
        let transport = ScriptedTransport::always(Scripted::Count(10));
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[("fast", 18.0), ("faster", 20.0), ("slow", 16.0)]);
        let scoring = ScoringConfig {
            thresholds: crate::scoring::ClassificationThresholds { buy: 1.0, watch: 0.5 },
            ..ScoringConfig::default()
        };
        let regions = vec![test_region("fast"), test_region("faster"), test_region("slow")];

        let report = score_regions(&analyzer, &market, &scoring, &regions).await;

        let keys: Vec<_> = report
            .buy_recommendations
            .iter()
            .map(|s| s.region.key.as_str())
            .collect();
        // All three land in the >=15 market band, so scores tie; ties break
        // by key ascending.
        assert_eq!(keys, vec!["fast", "faster", "slow"]);
    }

    #[tokio::test]
    async fn test_per_region_base_score_override() {
        let transport = ScriptedTransport::always(Scripted::Count(10));
        let analyzer = analyzer_with(transport, RegionalInfrastructureDatabase::default());
        let market = trends(&[("custom-base", 5.0)]);
        let scoring = ScoringConfig::default();
        let mut region = test_region("custom-base");
        region.base_score = Some(80.0);

        let report = score_regions(&analyzer, &market, &scoring, &[region]).await;

        let scored = &report.buy_recommendations[0];
        assert_eq!(scored.result.breakdown.base_score, 80.0);
    }
}
