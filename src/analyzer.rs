use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::error::AnalyzeError;
use crate::geodata::client::{ProximityClient, ProximityTransport};
use crate::geodata::fallback::RegionalInfrastructureDatabase;
use crate::geodata::types::{
    FeatureKind, InfrastructureRecord, ProximityQuery, RadiusTable, Region,
};

// Aggregation weights (sum = 1.0) and the count at which each feature's
// contribution saturates. Saturation keeps the aggregate bounded in [0, 100]
// and monotone non-decreasing in every count.
const W_HIGHWAYS: f64 = 0.35;
const W_AIRPORTS: f64 = 0.25;
const W_RAILWAYS: f64 = 0.25;
const W_PORTS: f64 = 0.15;

const HIGHWAY_TARGET: f64 = 20.0;
const AIRPORT_TARGET: f64 = 3.0;
const RAILWAY_TARGET: f64 = 10.0;
const PORT_TARGET: f64 = 5.0;

/// Where a region's infrastructure record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfraSource {
    /// All four feature queries answered live.
    Live,
    /// Some feature queries failed; missing counts are zeros.
    Partial,
    /// Every feature query failed; the static database record was used.
    Fallback,
}

impl InfraSource {
    pub fn label(self) -> &'static str {
        match self {
            InfraSource::Live => "live",
            InfraSource::Partial => "partial",
            InfraSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InfraAssessment {
    pub record: InfrastructureRecord,
    pub source: InfraSource,
}

/// Produces one infrastructure record per region by fanning four proximity
/// queries (one per feature kind) through the failover client.
pub struct InfrastructureAnalyzer<T> {
    client: ProximityClient<T>,
    fallback: RegionalInfrastructureDatabase,
    radii: RadiusTable,
}

impl<T: ProximityTransport> InfrastructureAnalyzer<T> {
    pub fn new(
        client: ProximityClient<T>,
        fallback: RegionalInfrastructureDatabase,
        radii: RadiusTable,
    ) -> Self {
        Self { client, fallback, radii }
    }

    /// Analyze one region. Partial failure degrades to zeros for the failed
    /// feature kinds; total failure substitutes the fallback database record
    /// verbatim, or reports the score as missing when the region has none.
    pub async fn analyze(&self, region: &Region) -> Result<InfraAssessment, AnalyzeError> {
        let mut queries = FuturesUnordered::new();
        for kind in FeatureKind::ALL {
            let query = ProximityQuery {
                center: region.center,
                feature: kind,
                radius_km: self.radii.for_kind(kind),
            };
            let client = &self.client;
            queries.push(async move { (kind, client.count_features(&query).await) });
        }

        let mut counts: [Option<u32>; 4] = [None; 4];
        while let Some((kind, result)) = queries.next().await {
            match result {
                Ok(count) => {
                    counts[kind.index()] = Some(count.min(u64::from(u32::MAX)) as u32);
                }
                Err(e) => warn!("region '{}': {}", region.key, e),
            }
        }

        let obtained = counts.iter().flatten().count();
        if obtained == 0 {
            if let Some(record) = self.fallback.get(&region.key) {
                warn!(
                    "region '{}': all proximity queries failed, substituting fallback database record",
                    region.key
                );
                return Ok(InfraAssessment { record: *record, source: InfraSource::Fallback });
            }
            return Err(AnalyzeError::ScoreMissing { region: region.key.clone() });
        }

        let highways = counts[FeatureKind::Highway.index()].unwrap_or(0);
        let airports = counts[FeatureKind::Airport.index()].unwrap_or(0);
        let railways = counts[FeatureKind::Railway.index()].unwrap_or(0);
        let ports = counts[FeatureKind::Port.index()].unwrap_or(0);

        let record = InfrastructureRecord {
            infra_score: aggregate_score(highways, airports, railways, ports),
            highways,
            airports,
            railways,
            ports,
        };
        let source = if obtained == FeatureKind::ALL.len() {
            InfraSource::Live
        } else {
            InfraSource::Partial
        };
        debug!(
            "region '{}': infra score {} ({} source, {} highways, {} airports, {} railways, {} ports)",
            region.key,
            record.infra_score,
            source.label(),
            highways,
            airports,
            railways,
            ports
        );
        Ok(InfraAssessment { record, source })
    }
}

/// Weighted, per-feature-saturating combination of the four counts,
/// normalized into [0, 100].
pub fn aggregate_score(highways: u32, airports: u32, railways: u32, ports: u32) -> u8 {
    let saturating = |count: u32, target: f64| (f64::from(count) / target).min(1.0);
    let score = 100.0
        * (W_HIGHWAYS * saturating(highways, HIGHWAY_TARGET)
            + W_AIRPORTS * saturating(airports, AIRPORT_TARGET)
            + W_RAILWAYS * saturating(railways, RAILWAY_TARGET)
            + W_PORTS * saturating(ports, PORT_TARGET));
    score.round().clamp(0.0, 100.0) as u8
}
