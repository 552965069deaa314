//! Shared logging utilities for cmuclmtk binaries.
//!
//! Console output always goes to stderr so that tools piping artifacts
//! through stdout stay clean. An optional plain-text log file can be
//! appended to under `~/.cmuclmtk/logs`.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "cmuclmtk=info";
const VERBOSE_LOG_FILTER: &str = "cmuclmtk=debug";
const HOME_ENV: &str = "CMUCLMTK_HOME";

/// Logging configuration shared by cmuclmtk binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Also append logs to `<logs_dir>/<app_name>.log`.
    pub log_to_file: bool,
}

/// Initialize tracing with stderr output and an optional log file.
///
/// `RUST_LOG` wins over both the default filter and `verbose`.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = build_filter(config.verbose);

    let file_layer = if config.log_to_file {
        let dir = ensure_logs_dir()?;
        let file = open_log_file(&dir, config.app_name)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(build_filter(config.verbose)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(VERBOSE_LOG_FILTER)
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    })
}

/// Get the cmuclmtk home directory: `$CMUCLMTK_HOME` or `~/.cmuclmtk`.
pub fn cmuclmtk_home() -> Option<PathBuf> {
    if let Ok(override_path) = std::env::var(HOME_ENV) {
        if !override_path.trim().is_empty() {
            return Some(PathBuf::from(override_path));
        }
    }
    dirs::home_dir().map(|home| home.join(".cmuclmtk"))
}

/// Get the logs directory: `~/.cmuclmtk/logs`
pub fn logs_dir() -> Option<PathBuf> {
    cmuclmtk_home().map(|home| home.join("logs"))
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir().context("Could not determine home directory for logs")?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn open_log_file(dir: &Path, app_name: &str) -> Result<File> {
    let path = dir.join(format!("{}.log", sanitize_name(app_name)));
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "cmuclmtk".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_replaces_path_separators() {
        assert_eq!(sanitize_name("cmuclmtk"), "cmuclmtk");
        assert_eq!(sanitize_name("../evil name"), "___evil_name");
        assert_eq!(sanitize_name(""), "cmuclmtk");
    }

    #[test]
    fn test_open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        {
            use std::io::Write;
            let mut file = open_log_file(dir.path(), "app").unwrap();
            writeln!(file, "first").unwrap();
        }
        {
            use std::io::Write;
            let mut file = open_log_file(dir.path(), "app").unwrap();
            writeln!(file, "second").unwrap();
        }
        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
