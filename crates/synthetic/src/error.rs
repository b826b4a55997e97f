use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Invalid distribution: mean {mean}, std dev {std_dev}")]
    InvalidDistribution { mean: f64, std_dev: f64 },

    #[error("Invalid sampling interval: {0}")]
    InvalidInterval(String),

    #[error("Failed to build series: {0}")]
    Series(#[from] CoreError),
}
