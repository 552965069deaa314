//! Toolkit configuration
//!
//! Reads settings from `~/.cmuclmtk/config.toml`. A missing file yields
//! defaults; `CMUCLMTK_BIN_DIR` overrides `[toolkit].bin_dir`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ClmtkError, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const BIN_DIR_ENV: &str = "CMUCLMTK_BIN_DIR";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClmtkConfig {
    #[serde(default)]
    pub toolkit: ToolkitSection,

    #[serde(default)]
    pub temp: TempSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Where to find the CMUCLMTK binaries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolkitSection {
    /// Directory searched before `$PATH`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,
}

/// Where scoped temporary files are created.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TempSection {
    /// Defaults to the system temp directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Append logs to `~/.cmuclmtk/logs/cmuclmtk.log` as well as stderr.
    #[serde(default)]
    pub file: bool,
}

impl ClmtkConfig {
    /// Default config location, `None` if no home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        cmuclmtk_logging::cmuclmtk_home().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load from the default location (or defaults if absent), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::from_file(path)?.with_env_overrides())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClmtkError::io(format!("Failed to read config {}", path.display()), e))?;
        Self::parse(&content).map_err(|message| ClmtkError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse TOML content.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(BIN_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.toolkit.bin_dir = Some(PathBuf::from(dir));
            }
        }
        self
    }
}
