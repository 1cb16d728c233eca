use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Transport infrastructure categories queried from the geodata service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Highway,
    Airport,
    Railway,
    Port,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::Highway,
        FeatureKind::Airport,
        FeatureKind::Railway,
        FeatureKind::Port,
    ];

    /// Stable lowercase name used in query strings and config keys.
    pub fn wire_name(self) -> &'static str {
        match self {
            FeatureKind::Highway => "highway",
            FeatureKind::Airport => "airport",
            FeatureKind::Railway => "railway",
            FeatureKind::Port => "port",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FeatureKind::Highway => 0,
            FeatureKind::Airport => 1,
            FeatureKind::Railway => 2,
            FeatureKind::Port => 3,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Per-feature search radii in kilometers. Sparser feature types get larger
/// radii so rural regions still yield signal.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadiusTable {
    pub highway: f64,
    pub airport: f64,
    pub railway: f64,
    pub port: f64,
}

impl Default for RadiusTable {
    fn default() -> Self {
        Self {
            highway: 50.0,
            airport: 100.0,
            railway: 25.0,
            port: 50.0,
        }
    }
}

impl RadiusTable {
    pub fn for_kind(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Highway => self.highway,
            FeatureKind::Airport => self.airport,
            FeatureKind::Railway => self.railway,
            FeatureKind::Port => self.port,
        }
    }
}

/// A named geographic area subject to investment scoring. Immutable once
/// defined; sourced from configuration.
#[derive(Debug, Clone)]
pub struct Region {
    pub key: String,
    pub name: Option<String>,
    pub center: Coordinate,
    /// Per-region fundamentals override; falls back to the scoring config.
    pub base_score: Option<f64>,
}

impl Region {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// One outbound geodata request: count features of one kind within a radius
/// of the region center.
#[derive(Debug, Clone, Copy)]
pub struct ProximityQuery {
    pub center: Coordinate,
    pub feature: FeatureKind,
    pub radius_km: f64,
}

/// Infrastructure counts plus the aggregate score for one region. Either
/// produced live by successful proximity queries or read verbatim from the
/// fallback database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InfrastructureRecord {
    /// Aggregate infrastructure score, always in [0, 100].
    pub infra_score: u8,
    pub highways: u32,
    pub airports: u32,
    pub railways: u32,
    pub ports: u32,
}

impl InfrastructureRecord {
    pub fn count(&self, kind: FeatureKind) -> u32 {
        match kind {
            FeatureKind::Highway => self.highways,
            FeatureKind::Airport => self.airports,
            FeatureKind::Railway => self.railways,
            FeatureKind::Port => self.ports,
        }
    }
}
