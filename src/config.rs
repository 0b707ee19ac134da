//! Configuration loading and management
//!
//! Handles parsing of `flow.toml`. Lookup order: explicit `--config` path,
//! `FLOW_CONFIG`, then the platform config directory. A missing file means
//! defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which persistence backend the CLI talks to
    #[serde(default)]
    pub backend: Backend,

    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote record-API configuration
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Description generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Persistence backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

/// Local storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory override; defaults to the platform data dir
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Simulate backing-store latency on repository operations
    #[serde(default)]
    pub simulate_latency: bool,
}

/// Remote record-API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the record service (required for the remote backend)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Description generator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// URL of the description-generation endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// location when `path` is `None`. A missing file yields defaults; an
    /// unreadable or invalid file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        Ok(config)
    }

    /// Default config file location (`<config-dir>/flow.toml`).
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "focus-flow", "flow")
            .map(|dirs| dirs.config_dir().join("flow.toml"))
    }

    /// Resolve the data directory: explicit override, then config, then the
    /// platform data dir.
    pub fn data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = self.storage.data_dir.as_ref() {
            return Ok(dir.clone());
        }
        ProjectDirs::from("dev", "focus-flow", "flow")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "cannot determine a data directory; set [storage].data_dir".to_string(),
                )
            })
    }

    /// Generator endpoint, required for description generation.
    pub fn generator_endpoint(&self) -> Result<&str> {
        self.generator
            .endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "description generation requires [generator].endpoint".to_string(),
                )
            })
    }

    /// Write this configuration to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
