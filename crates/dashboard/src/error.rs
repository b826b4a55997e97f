use analytics::MetricError;
use synthetic::GeneratorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid panel configuration: {0}")]
    Config(String),

    #[error("Failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize panel: {0}")]
    Serialize(#[from] serde_json::Error),
}
