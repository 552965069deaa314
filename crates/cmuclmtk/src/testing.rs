//! Test double for `ToolRunner`: records invocations instead of spawning.
//! Also a log capture for asserting on `tracing` output.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{ClmtkError, Result};
use crate::runner::{Invocation, StdinSource, StdoutTarget, ToolOutput, ToolRunner};
use crate::tools::Tool;

#[derive(Default)]
struct State {
    calls: Vec<Invocation>,
    stdin_seen: Vec<Option<String>>,
    missing: Vec<Tool>,
    failures: HashMap<Tool, (i32, String)>,
    stdout: HashMap<Tool, String>,
}

/// Cheap to clone; clones share the recorded calls.
#[derive(Clone, Default)]
pub(crate) struct RecordingRunner {
    state: Arc<Mutex<State>>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn missing(self, tool: Tool) -> Self {
        self.state.lock().unwrap().missing.push(tool);
        self
    }

    pub(crate) fn failing(self, tool: Tool, code: i32, stderr: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(tool, (code, stderr.to_string()));
        self
    }

    /// Text the fake tool writes to stdout (file target or capture).
    pub(crate) fn stdout(self, tool: Tool, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .stdout
            .insert(tool, text.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Content of stdin at the time of each call.
    pub(crate) fn stdin_seen(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().stdin_seen.clone()
    }
}

impl ToolRunner for RecordingRunner {
    fn locate(&self, tool: Tool) -> Result<PathBuf> {
        if self.state.lock().unwrap().missing.contains(&tool) {
            return Err(ClmtkError::ToolNotFound {
                tool: tool.binary_name().to_string(),
                searched: "$PATH".to_string(),
            });
        }
        Ok(Path::new("/fake/bin").join(tool.binary_name()))
    }

    fn run(&self, _program: &Path, invocation: &Invocation) -> Result<ToolOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(invocation.clone());

        let stdin = match &invocation.stdin {
            StdinSource::File(path) => std::fs::read_to_string(path).ok(),
            StdinSource::Null => None,
        };
        state.stdin_seen.push(stdin);

        let text = state
            .stdout
            .get(&invocation.tool)
            .cloned()
            .unwrap_or_default();
        let mut captured = String::new();
        match &invocation.stdout {
            StdoutTarget::File(path) => std::fs::write(path, &text).unwrap(),
            StdoutTarget::Capture => captured = text,
        }
        // Path-flag outputs (-idngram, -arpa, -binary) are created by the tool.
        for path in &invocation.outputs {
            std::fs::write(path, format!("{} output\n", invocation.tool)).unwrap();
        }

        Ok(match state.failures.get(&invocation.tool) {
            Some((code, stderr)) => ToolOutput {
                exit_code: Some(*code),
                success: false,
                stdout: captured,
                stderr: stderr.clone().into_bytes(),
            },
            None => ToolOutput {
                exit_code: Some(0),
                success: true,
                stdout: captured,
                stderr: Vec::new(),
            },
        })
    }
}

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return everything it logged.
pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
