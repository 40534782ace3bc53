//! Directory capability trait.

use async_trait::async_trait;
use bytes::Bytes;

use super::RootResult;

/// A directory-like node of a storage root.
///
/// This is the only surface the resolver sees: descend one level by name, or
/// read one file by name. Names are single path segments, never paths.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a nested directory by name.
    async fn subdirectory(&self, name: &str) -> RootResult<Box<dyn Directory>>;

    /// Read the raw bytes of a file in this directory.
    async fn read_file(&self, name: &str) -> RootResult<Bytes>;
}
