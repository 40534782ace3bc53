use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::Command;
use crate::root::RootHandle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File names tried, in order, for requests ending in `/`
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,

    /// Base path of the control API; never intercepted
    #[serde(default = "default_control_path")]
    pub control_path: String,

    /// Where the root map is persisted
    #[serde(default)]
    pub store: StoreConfig,

    /// Prefixes registered at startup
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Persistent store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the store (defaults to the platform data dir)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_store_name")]
    pub name: String,
}

/// A prefix bound to local directories, highest priority first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    pub prefix: String,
    pub roots: Vec<PathBuf>,
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

fn default_control_path() -> String {
    "/_lws".to_string()
}

fn default_database() -> String {
    "lws-db".to_string()
}

fn default_store_name() -> String {
    "root-map".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_files: default_index_files(),
            control_path: default_control_path(),
            store: StoreConfig::default(),
            mounts: Vec::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            database: default_database(),
            name: default_store_name(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let control = &self.control_path;
        if !control.starts_with('/') || control.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "control_path must start with '/' and must not end with '/': {:?}",
                control
            )));
        }

        if self.index_files.iter().any(|f| f.is_empty() || f.contains('/')) {
            return Err(ConfigError::Invalid(
                "index_files must be plain file names".to_string(),
            ));
        }

        for mount in &self.mounts {
            if mount.prefix.is_empty() {
                return Err(ConfigError::Invalid("mount prefix is empty".to_string()));
            }
        }

        Ok(())
    }

    /// Check if a request path belongs to the control API
    pub fn is_control_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.control_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl StoreConfig {
    /// Store directory, falling back to `<data dir>/lws`, then `./.lws`
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("lws")))
            .unwrap_or_else(|| PathBuf::from(".lws"))
    }
}

impl MountConfig {
    /// Command registering this mount. Root paths are made absolute when they exist.
    /// Build the `SET_ROOTS` command, canonicalizing directories that exist.
    pub async fn to_command(&self) -> Command {
        let mut roots = Vec::with_capacity(self.roots.len());
        for path in &self.roots {
            let resolved = tokio::fs::canonicalize(path)
                .await
                .unwrap_or_else(|_| path.clone());
            roots.push(RootHandle::local(resolved));
        }
        Command::SetRoots {
            prefix: self.prefix.clone(),
            roots,
        }
    }
}

/// Parses `PREFIX=DIR[,DIR...]`
impl FromStr for MountConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, roots) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PREFIX=DIR[,DIR...], got {:?}", s))?;
        if prefix.is_empty() {
            return Err("mount prefix is empty".to_string());
        }

        let roots: Vec<PathBuf> = roots
            .split(',')
            .filter(|r| !r.is_empty())
            .map(PathBuf::from)
            .collect();
        if roots.is_empty() {
            return Err(format!("mount {:?} has no directories", prefix));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            roots,
        })
    }
}
