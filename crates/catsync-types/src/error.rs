use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid root id: {0}")]
    InvalidRootId(String),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("empty identifier")]
    EmptyIdentifier,
}
