pub mod bands;
pub mod config;
pub mod engine;
pub mod validation;

pub use bands::{Band, Classification, ClassificationThresholds, TierTable};
pub use config::{MissingInfraPolicy, ScoringConfig};
pub use engine::{calculate_score, ScoreBreakdown, ScoreResult, ScoringInput};
pub use validation::validate_scoring;
