//! Storage roots.
//!
//! A [`RootHandle`] is the persisted, serializable reference to a directory-like
//! storage root. Opening it yields a [`Directory`] capability; the resolver
//! never looks behind that trait. Backends:
//! - Local filesystem directories
//! - In-memory trees (embedding, tests)

mod error;
mod local;
mod memory;
mod traits;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use error::{RootError, RootResult};
pub use local::LocalDirectory;
pub use memory::{MemoryDirectory, MemoryEntry};
pub use traits::Directory;

/// Opaque reference to a storage root.
///
/// Serialized as `{"type": "local", "path": "/srv/site"}` or
/// `{"type": "memory", "name": "fixtures", "tree": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RootHandle {
    /// Directory on the local filesystem.
    Local { path: PathBuf },
    /// In-memory directory tree.
    Memory {
        name: String,
        #[serde(default)]
        tree: MemoryDirectory,
    },
}

impl RootHandle {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        RootHandle::Local { path: path.into() }
    }

    pub fn memory(name: impl Into<String>, tree: MemoryDirectory) -> Self {
        RootHandle::Memory {
            name: name.into(),
            tree,
        }
    }

    /// Open the root directory.
    pub fn open(&self) -> Box<dyn Directory> {
        match self {
            RootHandle::Local { path } => Box::new(LocalDirectory::new(path.clone())),
            RootHandle::Memory { tree, .. } => Box::new(tree.clone()),
        }
    }
}

impl fmt::Display for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootHandle::Local { path } => write!(f, "local:{}", path.display()),
            RootHandle::Memory { name, .. } => write!(f, "memory:{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_handle_json_shape() {
        let handle = RootHandle::local("/srv/site");
        let value = serde_json::to_value(&handle).unwrap();
        assert_eq!(value, json!({"type": "local", "path": "/srv/site"}));

        let back: RootHandle = serde_json::from_value(value).unwrap();
        assert_eq!(back, handle);
    }

    #[test]
    fn test_memory_handle_json_shape() {
        let handle = RootHandle::memory("fixtures", MemoryDirectory::new().with_file("a.txt", "A"));
        let value = serde_json::to_value(&handle).unwrap();
        assert_eq!(
            value,
            json!({"type": "memory", "name": "fixtures", "tree": {"a.txt": {"file": [65]}}})
        );
    }

    #[test]
    fn test_memory_tree_defaults_to_empty() {
        let handle: RootHandle =
            serde_json::from_value(json!({"type": "memory", "name": "blank"})).unwrap();
        assert_eq!(handle, RootHandle::memory("blank", MemoryDirectory::new()));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<RootHandle, _> =
            serde_json::from_value(json!({"type": "ftp", "url": "ftp://example.com"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RootHandle::local("/srv").to_string(), "local:/srv");
        assert_eq!(
            RootHandle::memory("m", MemoryDirectory::new()).to_string(),
            "memory:m"
        );
    }

    #[tokio::test]
    async fn test_open_memory_root() {
        let handle = RootHandle::memory("m", MemoryDirectory::new().with_file("x/y.txt", "y"));
        let root = handle.open();
        let x = root.subdirectory("x").await.unwrap();
        assert_eq!(&x.read_file("y.txt").await.unwrap()[..], b"y");
    }
}
