use thiserror::Error;

/// Errors from constructing foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A digest string was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A digest had the wrong number of bytes.
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
