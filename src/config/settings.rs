//! TOML-based configuration for Trellis.
//!
//! Supports a config file (trellis.toml); every section is optional and
//! falls back to defaults.
//!
//! Example configuration:
//! ```toml
//! [limits]
//! preview_rows = 100
//! pivot_rows = 1000
//! guest_rows = 100
//!
//! [context]
//! max_chars = 10000
//!
//! [sql]
//! dialect = "postgres"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::{DEFAULT_PIVOT_ROW_LIMIT, DEFAULT_PREVIEW_ROW_LIMIT};
use crate::semantic::context::DEFAULT_MAX_CHARS;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub limits: LimitSettings,
    pub context: ContextSettings,
    pub sql: SqlSettings,
}

/// Row caps applied to generated queries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Cap for unaggregated preview queries.
    pub preview_rows: u64,
    /// Cap for aggregated pivot queries.
    pub pivot_rows: u64,
    /// Hard cap forced onto queries from guest/restricted callers.
    pub guest_rows: u64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROW_LIMIT,
            pivot_rows: DEFAULT_PIVOT_ROW_LIMIT,
            guest_rows: DEFAULT_PREVIEW_ROW_LIMIT,
        }
    }
}

/// Semantic-context generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Character budget for the AI context document.
    pub max_chars: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// SQL generation settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    pub dialect: Dialect,
}

impl Settings {
    /// Load settings from a specific file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from the first config file found, or defaults when none exists.
    ///
    /// Search order: `./trellis.toml`, then `<config dir>/trellis/trellis.toml`.
    pub fn load_or_default() -> Result<Self, SettingsError> {
        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("trellis.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("trellis").join("trellis.toml"));
        }
        paths
    }
}
