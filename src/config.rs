//! Application configuration.
//!
//! Holds the durable offline toggle. The flag is read once when the
//! directory controller is created and written back on every
//! `set_offline`, so it survives restarts.
//!
//! Configuration is stored at `<config dir>/rolocache/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/store directory paths
const APP_NAME: &str = "rolocache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Overridden in tests; `None` means the platform config directory.
    #[serde(skip)]
    config_dir: Option<PathBuf>,

    #[serde(default)]
    pub offline: bool,
}

impl Config {
    /// Load from the default config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_dir()?)
    }

    /// Load from an explicit directory.
    pub fn load_from(config_dir: PathBuf) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.config_dir = Some(config_dir);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path(&self) -> Result<PathBuf> {
        let dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => Self::default_dir()?,
        };
        Ok(dir.join(CONFIG_FILE))
    }

    fn default_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }

    /// Default per-user directory for the record store.
    pub fn store_dir() -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
