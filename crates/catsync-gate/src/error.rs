/// Errors that can occur while asking for a confirmation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    /// Nobody is listening for confirmation requests any more.
    #[error("confirmation channel closed; no interactive caller is listening")]
    Unavailable,

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;
