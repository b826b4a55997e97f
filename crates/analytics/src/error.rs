use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Cannot compute metrics on an empty series")]
    EmptySeries,

    #[error("Requested {requested} anomalies but the series only has {available} samples")]
    InvalidAnomalyCount { requested: usize, available: usize },

    #[error("Invalid anomaly index: {0}")]
    InvalidAnomalyIndex(#[from] CoreError),

    #[error("Non-finite input: {0}")]
    NonFiniteInput(String),
}
