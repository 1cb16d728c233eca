pub mod client;
pub mod failover;
pub mod fallback;
pub mod types;

pub use client::{HttpTransport, ProximityClient, ProximityTransport};
pub use failover::{AttemptPlan, AttemptSchedule};
pub use fallback::RegionalInfrastructureDatabase;
pub use types::{
    Coordinate, FeatureKind, InfrastructureRecord, ProximityQuery, RadiusTable, Region,
};
