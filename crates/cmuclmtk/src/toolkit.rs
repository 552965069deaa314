//! Pipeline invoker
//!
//! `Toolkit` holds a runner and a temp space, created once and reused for
//! every call. Each primitive follows the same order:
//! 1. resolve the binary (fail before touching the filesystem)
//! 2. prepare inputs and the output target
//! 3. run, log stderr, map non-zero exit to `ToolExecution`
//!
//! Primitives live in `crate::tools`, chains in `crate::shortcuts`.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::artifact::TempSpace;
use crate::config::ClmtkConfig;
use crate::error::{ClmtkError, Result};
use crate::runner::{Invocation, SystemRunner, ToolOutput, ToolRunner};
use crate::tools::Tool;

pub struct Toolkit {
    runner: Box<dyn ToolRunner>,
    temp: TempSpace,
}

impl Toolkit {
    /// Toolkit backed by the real binaries, configured from `config`.
    pub fn new(config: &ClmtkConfig) -> Self {
        Self {
            runner: Box::new(SystemRunner::new(config.toolkit.bin_dir.clone())),
            temp: TempSpace::new(config.temp.dir.clone()),
        }
    }

    /// Toolkit with a custom runner (e.g. a test double).
    pub fn with_runner(runner: impl ToolRunner + 'static, temp_dir: Option<PathBuf>) -> Self {
        Self {
            runner: Box::new(runner),
            temp: TempSpace::new(temp_dir),
        }
    }

    pub(crate) fn temp(&self) -> &TempSpace {
        &self.temp
    }

    pub(crate) fn locate(&self, tool: Tool) -> Result<PathBuf> {
        self.runner.locate(tool)
    }

    /// Run a prepared invocation and turn a failed exit into an error.
    pub(crate) fn execute(&self, program: &Path, invocation: &Invocation) -> Result<ToolOutput> {
        let command_line = invocation.command_line();
        debug!("Running command '{}'", command_line);

        let output = self.runner.run(program, invocation)?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            let message = line.trim();
            if !message.is_empty() {
                debug!(tool = %invocation.tool, "{}", message);
            }
        }

        match output.exit_code {
            Some(code) => debug!("Command '{}' returned with exit code '{}'.", command_line, code),
            None => debug!("Command '{}' was terminated by a signal.", command_line),
        }

        if !output.success {
            return Err(ClmtkError::ToolExecution {
                tool: invocation.tool.binary_name().to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        for path in &invocation.outputs {
            debug!(tool = %invocation.tool, "Wrote {}", path.display());
        }

        Ok(output)
    }

    /// Resolve every CMUCLMTK binary and report which ones are missing.
    pub fn check_installation(&self) -> InstallationReport {
        let mut report = InstallationReport::default();
        for tool in Tool::ALL {
            match self.runner.locate(tool) {
                Ok(path) => report.found.push((tool, path)),
                Err(_) => {
                    error!(
                        "Can't find CMUCLMTK command '{}'! Please check if CMUCLMTK is installed and in your $PATH.",
                        tool
                    );
                    report.missing.push(tool);
                }
            }
        }
        if report.is_complete() {
            info!("All {} CMUCLMTK commands found", report.found.len());
        }
        report
    }
}

/// Result of [`Toolkit::check_installation`].
#[derive(Debug, Default, Clone)]
pub struct InstallationReport {
    pub found: Vec<(Tool, PathBuf)>,
    pub missing: Vec<Tool>,
}

impl InstallationReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Path a tool resolved to, if it was found.
    pub fn path_of(&self, tool: Tool) -> Option<&Path> {
        self.found
            .iter()
            .find(|(t, _)| *t == tool)
            .map(|(_, path)| path.as_path())
    }
}
