//! Runtime configuration loaded from TOML.
//!
//! Lookup order: an explicit path, then `$STEPWISE_CONFIG`, then
//! `<config dir>/stepwise/config.toml`. With none of those present the
//! defaults apply.

use crate::debugger::DebugMode;
use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::debug;

pub const CONFIG_ENV_VAR: &str = "STEPWISE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub pool: PoolConfig,
    pub logging: LoggingConfig,
    pub debugger: DebuggerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// How long an idle worker thread is kept before it is reclaimed.
    pub keep_alive_secs: u64,
    /// Upper bound on simultaneously running programs.
    pub max_threads: usize,
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: 2 * 60 * 60,
            max_threads: 512,
            thread_name: "stepwise-program".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Mode used when a run is started without an explicit one.
    pub default_mode: DebugMode,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            default_mode: DebugMode::Breakpoint,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| RuntimeError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load configuration following the documented lookup order.
    ///
    /// An explicit path or `$STEPWISE_CONFIG` must point at a readable file;
    /// the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Self::from_file(Path::new(&path));
        }
        match Self::user_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepwise").join("config.toml"))
    }
}
