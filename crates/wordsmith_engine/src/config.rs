use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wordsmith_core::{InMemoryResultCache, ProcedureOptions, StalenessPolicy};
use wordsmith_logging::{ws_info, ws_warn};

use crate::http::ApiSettings;

pub const CONFIG_FILENAME: &str = "wordsmith.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `None` keeps results until they are invalidated.
    pub stale_after_secs: Option<u64>,
}

impl CacheSettings {
    pub fn policy(&self) -> StalenessPolicy {
        StalenessPolicy::from_secs(self.stale_after_secs)
    }
}

/// Everything a host needs to wire up procedures. Missing sections fall back
/// to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordsmithConfig {
    pub api: ApiSettings,
    pub procedure: ProcedureOptions,
    pub cache: CacheSettings,
}

impl WordsmithConfig {
    pub fn build_cache(&self) -> InMemoryResultCache {
        InMemoryResultCache::new(self.cache.policy())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

pub fn parse_config(content: &str) -> Result<WordsmithConfig, ConfigError> {
    ron::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}

/// Loads a RON config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<WordsmithConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            ws_info!("No config at {:?}, using defaults", path);
            return Ok(WordsmithConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    };

    let config = parse_config(&content).inspect_err(|err| {
        ws_warn!("Rejected config {:?}: {}", path, err);
    })?;
    ws_info!("Loaded config from {:?}", path);
    Ok(config)
}

pub fn save_config(path: &Path, config: &WordsmithConfig) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)
        .map_err(|err| ConfigError::Serialize(err.to_string()))?;
    fs::write(path, content).map_err(|err| ConfigError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
