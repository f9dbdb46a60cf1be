//! Runtime configuration: bind address, dataset locations and palette sizing.
//!
//! Resolution order: built-in defaults, then the YAML file named by
//! `CAMP_ATLAS_CONFIG` (if set), then the `CAMP_ATLAS_BIND` / `CAMP_ATLAS_DATA_DIR`
//! environment overrides.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::{DEFAULT_TOP_FIRMS, MAX_TOP_FIRMS};

pub const CONFIG_PATH_ENV: &str = "CAMP_ATLAS_CONFIG";
pub const BIND_ENV: &str = "CAMP_ATLAS_BIND";
pub const DATA_DIR_ENV: &str = "CAMP_ATLAS_DATA_DIR";

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CAMPS_FILE: &str = "camps.json";
pub const DEFAULT_BORDERS_FILE: &str = "german_borders.geojson";
pub const DEFAULT_COUNTRIES_FILE: &str = "maps_1938.geojson";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    pub camps_file: String,
    pub borders_file: String,
    pub countries_file: String,
    /// Number of firms that keep their own colour.
    pub top_firms: usize,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            camps_file: DEFAULT_CAMPS_FILE.to_string(),
            borders_file: DEFAULT_BORDERS_FILE.to_string(),
            countries_file: DEFAULT_COUNTRIES_FILE.to_string(),
            top_firms: DEFAULT_TOP_FIRMS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read atlas config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse atlas config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("top_firms must be between 1 and {max}, got {value}")]
    TopFirms { value: usize, max: usize },
}

impl AtlasConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AtlasConfig = serde_yaml::from_str(raw)?;
        config.validated()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Defaults, optionally replaced by the `CAMP_ATLAS_CONFIG` file, then env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) {
            Some(path) => {
                let config = Self::from_file(&path)?;
                tracing::info!(
                    target: "camp_atlas::config",
                    path = %path.display(),
                    "atlas_config.loaded=file"
                );
                config
            }
            None => {
                tracing::debug!(target: "camp_atlas::config", "atlas_config.loaded=builtin");
                Self::default()
            }
        };

        if let Ok(bind) = env::var(BIND_ENV) {
            config.bind = bind;
        }
        if let Ok(data_dir) = env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(data_dir);
        }
        Ok(config)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if !(1..=MAX_TOP_FIRMS).contains(&self.top_firms) {
            return Err(ConfigError::TopFirms {
                value: self.top_firms,
                max: MAX_TOP_FIRMS,
            });
        }
        Ok(self)
    }

    pub fn camps_path(&self) -> PathBuf {
        self.data_dir.join(&self.camps_file)
    }

    pub fn borders_path(&self) -> PathBuf {
        self.data_dir.join(&self.borders_file)
    }

    pub fn countries_path(&self) -> PathBuf {
        self.data_dir.join(&self.countries_file)
    }
}
