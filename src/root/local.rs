//! Local filesystem root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use super::error::check_name;
use super::{Directory, RootError, RootResult};

/// A directory on the local filesystem.
///
/// Every lookup is confined to `base`: entries whose canonical path lands
/// outside of it (through a symlink) are reported as [`RootError::OutsideRoot`].
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    /// Directory the root handle was registered with.
    base: PathBuf,
    /// Directory this node points at.
    path: PathBuf,
}

impl LocalDirectory {
    /// Open a root at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            base: path.clone(),
            path,
        }
    }

    /// Directory this node points at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Join `name` onto this directory and verify the result stays inside the root.
    async fn resolve_child(&self, name: &str) -> RootResult<PathBuf> {
        check_name(name)?;
        let child = self.path.join(name);

        let base = canonicalize(&self.base).await?;
        let canonical = canonicalize(&child).await?;
        if !canonical.starts_with(&base) {
            return Err(RootError::OutsideRoot(child.display().to_string()));
        }
        Ok(canonical)
    }
}

async fn canonicalize(path: &Path) -> RootResult<PathBuf> {
    fs::canonicalize(path).await.map_err(|e| map_io(e, path))
}

fn map_io(err: std::io::Error, path: &Path) -> RootError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RootError::NotFound(path.display().to_string())
    } else {
        RootError::Io(err)
    }
}

#[async_trait]
impl Directory for LocalDirectory {
    async fn subdirectory(&self, name: &str) -> RootResult<Box<dyn Directory>> {
        let path = self.resolve_child(name).await?;
        let meta = fs::metadata(&path).await.map_err(|e| map_io(e, &path))?;
        if !meta.is_dir() {
            return Err(RootError::NotADirectory(path.display().to_string()));
        }

        Ok(Box::new(Self {
            base: self.base.clone(),
            path,
        }))
    }

    async fn read_file(&self, name: &str) -> RootResult<Bytes> {
        let path = self.resolve_child(name).await?;
        let meta = fs::metadata(&path).await.map_err(|e| map_io(e, &path))?;
        if !meta.is_file() {
            return Err(RootError::NotAFile(path.display().to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| map_io(e, &path))?;
        Ok(Bytes::from(data))
    }
}
