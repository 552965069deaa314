//! Error types for toolkit invocations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while invoking CMUCLMTK tools.
#[derive(Debug, Error)]
pub enum ClmtkError {
    /// The binary could not be resolved in `bin_dir` or on `$PATH`.
    #[error("CMUCLMTK command '{tool}' not found (searched {searched}). Is CMUCLMTK installed and in your $PATH?")]
    ToolNotFound { tool: String, searched: String },

    /// The tool ran but reported failure.
    ///
    /// `exit_code` is `None` when the process was terminated by a signal.
    /// `stderr` holds the captured diagnostic bytes, unchanged.
    #[error("'{tool}' returned with non-zero exit status '{}'{}", display_code(.exit_code), display_stderr(.stderr))]
    ToolExecution {
        tool: String,
        exit_code: Option<i32>,
        stderr: Vec<u8>,
    },

    /// Arguments rejected before any process was started.
    #[error("Invalid argument for '{tool}': {message}")]
    InvalidArgument { tool: String, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

/// Result type for toolkit operations
pub type Result<T> = std::result::Result<T, ClmtkError>;

impl ClmtkError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ClmtkError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid(tool: &str, message: impl Into<String>) -> Self {
        ClmtkError::InvalidArgument {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// True if the error means the environment lacks a binary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClmtkError::ToolNotFound { .. })
    }

    /// Exit code of a failed tool, if the failure was a process exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ClmtkError::ToolExecution { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Captured stderr of a failed tool, byte for byte.
    pub fn stderr(&self) -> Option<&[u8]> {
        match self {
            ClmtkError::ToolExecution { stderr, .. } => Some(stderr.as_slice()),
            _ => None,
        }
    }

    /// Name of the tool this error concerns, if any.
    pub fn tool(&self) -> Option<&str> {
        match self {
            ClmtkError::ToolNotFound { tool, .. }
            | ClmtkError::ToolExecution { tool, .. }
            | ClmtkError::InvalidArgument { tool, .. } => Some(tool.as_str()),
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn display_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
