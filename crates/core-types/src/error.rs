use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Timestamps must be strictly increasing (violated at sample {0})")]
    NonIncreasingTimestamp(usize),

    #[error("Index {index} is out of range for a series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Index {0} appears more than once")]
    DuplicateIndex(usize),
}
