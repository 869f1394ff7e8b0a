//! Configuration structs and file loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults;

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How predictions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    /// Built-in surrogate model; no external dependency.
    #[default]
    Surrogate,
    /// Remote model server reached over HTTP.
    Http,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// HTTP bind address.
    pub addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
        }
    }
}

/// `[model]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelSection {
    pub mode: ModelMode,
    /// Model server base URL; required when `mode = "http"`.
    pub endpoint: Option<String>,
    /// Per-request timeout for the model server. Absent means the call may
    /// block indefinitely — a deliberate operator choice, not a default we
    /// pick for them.
    pub request_timeout_secs: Option<u64>,
}

/// `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Seconds of inactivity before a session is evicted.
    pub idle_ttl_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            idle_ttl_secs: defaults::SESSION_IDLE_TTL_SECS,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub model: ModelSection,
    pub session: SessionSection,
}

impl AppConfig {
    /// Load configuration using the standard search order: the
    /// `PYROSIGHT_CONFIG` env var, then `./pyrosight.toml`, then defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("PYROSIGHT_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from PYROSIGHT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PYROSIGHT_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PYROSIGHT_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("pyrosight.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./pyrosight.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./pyrosight.toml, using defaults");
                }
            }
        }

        info!("No pyrosight.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Two-pass: unknown keys produce warnings (never failures), then serde
    /// deserialization and a hard validation pass.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Hard validation: impossible values that must prevent startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_values(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}
