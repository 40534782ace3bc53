//! Persistence error types.

use thiserror::Error;

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while saving or loading the persisted map.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The stored map could not be decoded.
    #[error("corrupt store {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// The persisted map was never loaded, so a save would overwrite it.
    #[error("root map was not loaded; not overwriting it")]
    NotLoaded,

    /// Storage backend error.
    #[error("backend error: {0}")]
    Backend(String),
}
