use std::path::PathBuf;

use thiserror::Error;

/// Main error type for segdex operations
#[derive(Error, Debug)]
pub enum SegdexError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{} already exists and is not a directory", .0.display())]
    PathConflict(PathBuf),

    #[error("Corrupt segment: {0}")]
    CorruptSegment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for segdex operations
pub type Result<T> = std::result::Result<T, SegdexError>;

impl SegdexError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        SegdexError::CorruptSegment(msg.into())
    }

    /// Check if this error means on-disk data could not be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SegdexError::CorruptSegment(_) | SegdexError::Serialization(_) | SegdexError::Manifest(_)
        )
    }
}
