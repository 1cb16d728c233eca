use std::time::Duration;

use thiserror::Error;

use crate::geodata::types::FeatureKind;

/// Failure of a single (endpoint, timeout) attempt. Network errors, timeouts,
/// bad statuses, and unparseable payloads are all recovered the same way:
/// advance to the next attempt in the schedule.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Terminal failure of one (region, feature) proximity query, raised only
/// after every attempt in the schedule has been exhausted.
#[derive(Error, Debug)]
pub enum ProximityError {
    #[error("{feature} query exhausted {attempts} attempts, last failure: {last}")]
    Exhausted {
        feature: FeatureKind,
        attempts: usize,
        last: AttemptError,
    },
}

/// A region with no live geodata and no fallback database entry. Surfaced
/// explicitly so the scorer can apply its configured policy; never folded
/// into a zero score.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("no live geodata and no fallback entry for region '{region}'")]
    ScoreMissing { region: String },
}
