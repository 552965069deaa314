//! Process execution
//!
//! - `Invocation` is plain data: which tool, which args, where stdin comes
//!   from, where stdout goes, which working directory.
//! - `ToolRunner` resolves binaries and runs invocations. Resolution is a
//!   separate step so callers can fail before creating any file.
//! - All I/O is synchronous; `Command::output` drains both pipes while the
//!   child runs.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ClmtkError, Result};
use crate::tools::Tool;

/// Where a tool reads its standard input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinSource {
    Null,
    File(PathBuf),
}

/// Where a tool's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    /// Captured into `ToolOutput::stdout`.
    Capture,
    /// Redirected into a file (truncated first).
    File(PathBuf),
}

/// A fully described tool call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: Tool,
    pub args: Vec<OsString>,
    pub stdin: StdinSource,
    pub stdout: StdoutTarget,
    pub current_dir: Option<PathBuf>,
    /// Files the tool writes itself, named by a path flag.
    pub outputs: Vec<PathBuf>,
}

impl Invocation {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            stdin: StdinSource::Null,
            stdout: StdoutTarget::Capture,
            current_dir: None,
            outputs: Vec::new(),
        }
    }

    /// Append a bare switch such as `-compress`.
    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(OsString::from(flag));
        self
    }

    /// Append `flag value`.
    pub fn opt(mut self, flag: &str, value: impl ToString) -> Self {
        self.args.push(OsString::from(flag));
        self.args.push(OsString::from(value.to_string()));
        self
    }

    /// Append `flag value` unless the value is zero.
    pub fn opt_nonzero(self, flag: &str, value: u64) -> Self {
        if value == 0 {
            self
        } else {
            self.opt(flag, value)
        }
    }

    /// Append `flag path` with the path kept as an OS string.
    pub fn opt_path(mut self, flag: &str, path: &Path) -> Self {
        self.args.push(OsString::from(flag));
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Append `flag path` for a file the tool creates, such as `-arpa`.
    pub fn opt_output(mut self, flag: &str, path: &Path) -> Self {
        self.outputs.push(path.to_path_buf());
        self.opt_path(flag, path)
    }

    /// Append a positional argument.
    pub fn positional(mut self, value: impl AsRef<OsStr>) -> Self {
        self.args.push(value.as_ref().to_os_string());
        self
    }

    pub fn stdin(mut self, stdin: StdinSource) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn stdout(mut self, stdout: StdoutTarget) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Arguments as UTF-8 (lossy), mostly for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Human-readable command line for logs.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.tool.binary_name().to_string()];
        parts.extend(self.args_lossy());
        parts.join(" ")
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Empty when stdout was redirected to a file.
    pub stdout: String,
    /// Raw bytes; tools echo corpus text that need not be UTF-8.
    pub stderr: Vec<u8>,
}

/// Resolves and runs toolkit binaries.
pub trait ToolRunner {
    /// Resolve the executable for `tool`, or fail with `ToolNotFound`.
    fn locate(&self, tool: Tool) -> Result<PathBuf>;

    /// Run a resolved program. Non-zero exits are returned as data, not errors.
    fn run(&self, program: &Path, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs the real binaries found in `bin_dir` or on `$PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    bin_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    fn searched(&self) -> String {
        match &self.bin_dir {
            Some(dir) => format!("{} and $PATH", dir.display()),
            None => "$PATH".to_string(),
        }
    }
}

impl ToolRunner for SystemRunner {
    fn locate(&self, tool: Tool) -> Result<PathBuf> {
        let name = tool.binary_name();

        if let Some(dir) = &self.bin_dir {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if let Ok(path) = which::which_in(name, Some(dir), cwd) {
                return Ok(path);
            }
        }

        which::which(name).map_err(|_| ClmtkError::ToolNotFound {
            tool: name.to_string(),
            searched: self.searched(),
        })
    }

    fn run(&self, program: &Path, invocation: &Invocation) -> Result<ToolOutput> {
        let name = invocation.tool.binary_name();
        let mut cmd = Command::new(program);
        cmd.args(&invocation.args).stderr(Stdio::piped());

        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        match &invocation.stdin {
            StdinSource::Null => {
                cmd.stdin(Stdio::null());
            }
            StdinSource::File(path) => {
                let file = File::open(path).map_err(|e| {
                    ClmtkError::io(format!("Failed to open input {} for {}", path.display(), name), e)
                })?;
                cmd.stdin(Stdio::from(file));
            }
        }

        match &invocation.stdout {
            StdoutTarget::Capture => {
                cmd.stdout(Stdio::piped());
            }
            StdoutTarget::File(path) => {
                let file = File::create(path).map_err(|e| {
                    ClmtkError::io(format!("Failed to create output {} for {}", path.display(), name), e)
                })?;
                cmd.stdout(Stdio::from(file));
            }
        }

        let output = cmd
            .output()
            .map_err(|e| ClmtkError::io(format!("Failed to run {}", name), e))?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: output.stderr,
        })
    }
}
