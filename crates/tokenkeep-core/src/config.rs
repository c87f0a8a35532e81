//! Library configuration management.
//!
//! This module handles loading and saving the library configuration,
//! which points at the identity/profile endpoint and optionally overrides
//! where durable state lives.
//!
//! Configuration is stored at `~/.config/tokenkeep/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Application name used for config/data directory paths
const APP_NAME: &str = "tokenkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Endpoint used when no configuration file exists
const DEFAULT_API_BASE_URL: &str = "http://localhost/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("reading config file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::Io(format!("parsing config file: {e}")))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("creating config directory: {e}")))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Io(format!("serializing config: {e}")))?;
        std::fs::write(path, contents).map_err(|e| Error::Io(format!("writing config file: {e}")))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Io("could not find config directory".into()))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding durable state (the file-backed credential store).
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| Error::Io("could not find data directory".into()))?;
        Ok(data_dir.join(APP_NAME))
    }
}
