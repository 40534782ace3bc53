//! Root lookup error types.

use thiserror::Error;

/// Result type for root lookups.
pub type RootResult<T> = Result<T, RootError>;

/// Errors raised while walking or reading a storage root.
///
/// The resolver treats every variant the same way: the candidate is not
/// available under this root and the next candidate is tried.
#[derive(Debug, Error)]
pub enum RootError {
    /// Entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Entry exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Entry exists but is not a regular file.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Name cannot address a single entry (empty, `.`, `..`, separators).
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// Entry resolves outside of the root (symlink escape).
    #[error("outside of root: {0}")]
    OutsideRoot(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that `name` addresses exactly one entry inside a directory.
pub(crate) fn check_name(name: &str) -> RootResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(RootError::InvalidName(name.to_string()));
    }
    Ok(())
}
