//! In-memory root.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::error::check_name;
use super::{Directory, RootError, RootResult};

/// An immutable in-memory directory tree.
///
/// Cloning is cheap; subtrees are shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryDirectory {
    entries: Arc<BTreeMap<String, MemoryEntry>>,
}

/// A node of a [`MemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryEntry {
    File(Vec<u8>),
    Dir(MemoryDirectory),
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a `/`-separated path, creating parent directories.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, MemoryEntry::File(contents.into()));
        self
    }

    /// Add an empty directory at a `/`-separated path.
    pub fn with_dir(mut self, path: &str) -> Self {
        self.insert(path, MemoryEntry::Dir(MemoryDirectory::new()));
        self
    }

    /// Insert `entry` at `path`, replacing whatever was there.
    ///
    /// A file standing where a parent directory is needed gets replaced by the directory.
    pub fn insert(&mut self, path: &str, entry: MemoryEntry) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.insert_at(&segments, entry);
    }

    fn insert_at(&mut self, segments: &[&str], entry: MemoryEntry) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        let entries = Arc::make_mut(&mut self.entries);
        if rest.is_empty() {
            entries.insert((*first).to_string(), entry);
            return;
        }

        let slot = entries
            .entry((*first).to_string())
            .or_insert_with(|| MemoryEntry::Dir(MemoryDirectory::new()));
        if let MemoryEntry::File(_) = slot {
            *slot = MemoryEntry::Dir(MemoryDirectory::new());
        }
        if let MemoryEntry::Dir(dir) = slot {
            dir.insert_at(rest, entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn subdirectory(&self, name: &str) -> RootResult<Box<dyn Directory>> {
        check_name(name)?;
        match self.entries.get(name) {
            Some(MemoryEntry::Dir(dir)) => Ok(Box::new(dir.clone())),
            Some(MemoryEntry::File(_)) => Err(RootError::NotADirectory(name.to_string())),
            None => Err(RootError::NotFound(name.to_string())),
        }
    }

    async fn read_file(&self, name: &str) -> RootResult<Bytes> {
        check_name(name)?;
        match self.entries.get(name) {
            Some(MemoryEntry::File(data)) => Ok(Bytes::copy_from_slice(data)),
            Some(MemoryEntry::Dir(_)) => Err(RootError::NotAFile(name.to_string())),
            None => Err(RootError::NotFound(name.to_string())),
        }
    }
}
