// YAML configuration for the todostore binary

use crate::kv::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
use crate::labels::Locale;
use crate::persist::DEFAULT_KEY;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// Storage directory; `None` means the platform data directory
    pub data_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub storage_key: String,
    pub locale: Locale,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: None,
            export_dir: PathBuf::from("."),
            storage_key: DEFAULT_KEY.to_string(),
            locale: Locale::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("todostore"))
                .ok_or_else(|| eyre!("Could not determine data directory; set data_dir in config")),
        }
    }

    /// Open the configured storage backend
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match self.backend {
            Backend::File => Box::new(FileStore::open(self.data_dir()?)?),
            Backend::Sqlite => Box::new(SqliteStore::open(self.data_dir()?)?),
            Backend::Memory => Box::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("todostore").join("config.yaml"))
}
