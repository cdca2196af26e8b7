use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("source entry has no root id; assign one before planning a write")]
    MissingRootId,

    #[error("target entry has no record id")]
    TargetWithoutId,
}

pub type MergeResult<T> = Result<T, MergeError>;
