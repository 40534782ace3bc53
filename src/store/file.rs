//! JSON file store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{Entries, MapStore, StoreError, StoreResult};

/// Stores the map as one JSON object at `<dir>/<database>/<name>.json`.
///
/// Saves write a sibling temp file and rename it over the target, so a reader
/// sees either the previous map or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, database: &str, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(database).join(format!("{}.json", name)),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl MapStore for JsonFileStore {
    async fn save(&self, entries: &Entries) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        fs::write(&temp, &data).await?;
        fs::rename(&temp, &self.path).await?;

        debug!(
            "Saved {} entries ({} bytes) to {}",
            entries.len(),
            data.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> StoreResult<Entries> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                return Ok(Entries::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_slice(&data).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
