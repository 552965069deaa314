//! Scoped files: tool inputs, tool outputs, scratch directories.
//!
//! Every temporary resource here is owned by a `tempfile` guard, so it is
//! removed when the guard drops, including when an error propagates with `?`.
//! Caller-supplied paths are never removed. Removal failures are logged.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir, TempPath};
use tracing::{debug, warn};

use crate::error::{ClmtkError, Result};

const TEMP_PREFIX: &str = "cmuclmtk-";

/// Text handed to a tool: either raw text or a file containing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    Text(String),
    File(PathBuf),
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Text(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Text(text)
    }
}

impl From<&Path> for TextInput {
    fn from(path: &Path) -> Self {
        TextInput::File(path.to_path_buf())
    }
}

impl From<PathBuf> for TextInput {
    fn from(path: PathBuf) -> Self {
        TextInput::File(path)
    }
}

impl From<&TextInput> for TextInput {
    fn from(input: &TextInput) -> Self {
        input.clone()
    }
}

/// A file produced by a tool.
///
/// Temporary artifacts are deleted when dropped unless `keep` or `persist`
/// is called first.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    temp: Option<TempPath>,
    report: String,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if this artifact will be deleted on drop.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Captured stdout of tools that write their artifact by path
    /// (`text2idngram`, `wngram2idngram`, `idngram2lm`, `binlm2arpa`).
    /// Empty for tools whose stdout is the artifact itself.
    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| ClmtkError::io(format!("Failed to read {}", self.path.display()), e))
    }

    /// Stop tracking the file and return its path. It is no longer deleted.
    pub fn keep(mut self) -> Result<PathBuf> {
        match self.temp.take() {
            Some(temp) => temp.keep().map_err(|e| {
                ClmtkError::io(format!("Failed to keep {}", self.path.display()), e.error)
            }),
            None => Ok(std::mem::take(&mut self.path)),
        }
    }

    /// Move the artifact to `dest` and return the new path.
    ///
    /// Falls back to copy-then-delete when a rename is not possible
    /// (e.g. across filesystems).
    pub fn persist(mut self, dest: &Path) -> Result<PathBuf> {
        match self.temp.take() {
            Some(temp) => match temp.persist(dest) {
                Ok(()) => Ok(dest.to_path_buf()),
                Err(err) => {
                    debug!("rename to {} failed ({}), copying", dest.display(), err.error);
                    let copied = copy_file(&err.path, dest);
                    remove_temp(err.path);
                    copied
                }
            },
            None => {
                if self.path != dest {
                    fs::rename(&self.path, dest).or_else(|_| {
                        fs::copy(&self.path, dest)
                            .and_then(|_| fs::remove_file(&self.path))
                    })
                    .map_err(|e| {
                        ClmtkError::io(
                            format!("Failed to move {} to {}", self.path.display(), dest.display()),
                            e,
                        )
                    })?;
                }
                Ok(dest.to_path_buf())
            }
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            remove_temp(temp);
        }
    }
}

/// Delete a temporary file, logging (not failing) if it cannot be removed.
/// A file that is already gone is not an error.
fn remove_temp(temp: TempPath) {
    let path = temp.to_path_buf();
    match temp.close() {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<PathBuf> {
    fs::copy(src, dest).map_err(|e| {
        ClmtkError::io(
            format!("Failed to copy {} to {}", src.display(), dest.display()),
            e,
        )
    })?;
    Ok(dest.to_path_buf())
}

/// Text ready to be fed to a tool: a path plus, for raw text, the guard
/// that deletes the spooled copy.
#[derive(Debug)]
pub(crate) struct PreparedText {
    path: PathBuf,
    spool: Option<TempPath>,
}

impl PreparedText {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreparedText {
    fn drop(&mut self) {
        if let Some(spool) = self.spool.take() {
            remove_temp(spool);
        }
    }
}

/// Output location chosen before a tool runs.
#[derive(Debug)]
pub(crate) struct OutputTarget {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl OutputTarget {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn into_artifact(mut self, report: String) -> Artifact {
        Artifact {
            path: std::mem::take(&mut self.path),
            temp: self.temp.take(),
            report,
        }
    }
}

impl Drop for OutputTarget {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            remove_temp(temp);
        }
    }
}

/// Scratch directory used as a tool's working directory.
#[derive(Debug)]
pub(crate) struct Workdir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workdir {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!("Failed to remove temporary directory {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Factory for scoped temporary files, rooted in the configured temp dir.
#[derive(Debug, Clone, Default)]
pub struct TempSpace {
    dir: Option<PathBuf>,
}

impl TempSpace {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Create an empty temporary file with the given suffix.
    ///
    /// The returned path is absolute, since some tools run with a different
    /// working directory.
    pub fn named_file(&self, suffix: &str) -> Result<TempPath> {
        let dir = match &self.dir {
            Some(dir) => absolutize(dir)?,
            None => std::env::temp_dir(),
        };
        let file = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(suffix)
            .tempfile_in(&dir)
            .map_err(|e| {
                ClmtkError::io(format!("Failed to create temporary file in {}", dir.display()), e)
            })?;
        Ok(file.into_temp_path())
    }

    /// Create a scratch directory used as a tool's working directory.
    pub(crate) fn workdir(&self) -> Result<Workdir> {
        let dir = match &self.dir {
            Some(dir) => absolutize(dir)?,
            None => std::env::temp_dir(),
        };
        let scratch = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(&dir)
            .map_err(|e| {
                ClmtkError::io(format!("Failed to create temporary directory in {}", dir.display()), e)
            })?;
        Ok(Workdir {
            path: scratch.path().to_path_buf(),
            dir: Some(scratch),
        })
    }

    /// Make text available as a file. Raw text is spooled to a temp file.
    pub(crate) fn prepare_text(&self, input: &TextInput) -> Result<PreparedText> {
        match input {
            TextInput::File(path) => Ok(PreparedText {
                path: absolutize(path)?,
                spool: None,
            }),
            TextInput::Text(text) => {
                let spool = self.named_file(".txt")?;
                let mut file = fs::File::create(&spool)
                    .map_err(|e| ClmtkError::io("Failed to open text spool file", e))?;
                file.write_all(text.as_bytes())
                    .and_then(|_| file.flush())
                    .map_err(|e| ClmtkError::io("Failed to write text spool file", e))?;
                Ok(PreparedText {
                    path: spool.to_path_buf(),
                    spool: Some(spool),
                })
            }
        }
    }

    /// Pick the output path: the caller's, or a fresh temporary one.
    pub(crate) fn output_target(&self, requested: Option<&Path>, suffix: &str) -> Result<OutputTarget> {
        match requested {
            Some(path) => Ok(OutputTarget {
                path: absolutize(path)?,
                temp: None,
            }),
            None => {
                let temp = self.named_file(suffix)?;
                Ok(OutputTarget {
                    path: temp.to_path_buf(),
                    temp: Some(temp),
                })
            }
        }
    }
}

/// Resolve `path` against the current directory without touching the disk.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| ClmtkError::io("Failed to read current directory", e))?;
    Ok(cwd.join(path))
}
