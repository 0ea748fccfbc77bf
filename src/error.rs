use thiserror::Error;

/// Everything that can go wrong during a mining run.
///
/// Mining is a pure in-memory computation, so none of these are transient:
/// they are surfaced to the caller immediately and never retried. Nothing
/// is emitted to the result sink after an error is detected.
#[derive(Debug, Error, PartialEq)]
pub enum MiningError {
    #[error("dataset contains no transactions")]
    EmptyDataset,

    #[error("minimum support {0} is outside (0, 1]")]
    InvalidSupport(f64),

    /// Internal invariant violation. Indicates a construction defect,
    /// never expected in correct operation.
    #[error("conditional database corrupted: {0}")]
    CorruptDatabase(&'static str),

    #[error("mining cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MiningError>;
