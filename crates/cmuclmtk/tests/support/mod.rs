//! Shell-script stand-ins for CMUCLMTK binaries.
//!
//! They mimic the tools' I/O contract (text on stdin, result on stdout,
//! diagnostics on stderr) closely enough to exercise the real process path.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use cmuclmtk::{ClmtkConfig, Toolkit};

/// Counts whitespace-separated words, like `text2wfreq` (no case folding).
pub const FAKE_TEXT2WFREQ: &str = r#"#!/bin/sh
[ "$1" = "-hash" ] || { echo "text2wfreq: expected -hash, got $1" >&2; exit 2; }
echo "text2wfreq : Reading text from standard input..." >&2
tr -s '[:space:]' '\n' | grep -v '^$' | sort | uniq -c | awk '{print $2" "$1}'
echo "text2wfreq : Done." >&2
"#;

/// Emits a header comment plus the sorted word column, like `wfreq2vocab`.
pub const FAKE_WFREQ2VOCAB: &str = r###"#!/bin/sh
echo "## Vocab generated by fake wfreq2vocab"
awk '{print $1}' | sort
"###;

/// Fails with a distinctive message and exit code 3.
pub const FAILING_TOOL: &str = r#"#!/bin/sh
cat > /dev/null
printf 'Error : hash table size must be positive.\n  (line 42)\n' >&2
exit 3
"#;

/// Echoes a Latin-1 (non-UTF-8) word on stderr and exits 5.
pub const LATIN1_FAILING_TOOL: &str = r#"#!/bin/sh
cat > /dev/null
printf 'unknown word caf\351\n' >&2
exit 5
"#;

/// Copies the text into the `-idngram` file and prints a short report.
pub const FAKE_TEXT2IDNGRAM: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -idngram) out="$2"; shift ;;
  esac
  shift
done
[ -n "$out" ] || { echo "text2idngram: no output file" >&2; exit 2; }
cat > "$out"
echo "fof table"
"#;

/// Writes its own argument list into the `-arpa`/`-binary` output file.
pub const FAKE_IDNGRAM2LM: &str = r#"#!/bin/sh
args="$*"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -arpa|-binary) out="$2"; shift ;;
  esac
  shift
done
[ -n "$out" ] || { echo "idngram2lm: no output file" >&2; exit 2; }
echo "$args" > "$out"
"#;

pub struct Sandbox {
    pub root: tempfile::TempDir,
    pub bin: PathBuf,
    pub tmp: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("sandbox root");
        let bin = root.path().join("bin");
        let tmp = root.path().join("tmp");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(&tmp).unwrap();
        Self { root, bin, tmp }
    }

    pub fn install(&self, name: &str, script: &str) -> &Self {
        install_script(&self.bin, name, script);
        self
    }

    pub fn toolkit(&self) -> Toolkit {
        let mut config = ClmtkConfig::default();
        config.toolkit.bin_dir = Some(self.bin.clone());
        config.temp.dir = Some(self.tmp.clone());
        Toolkit::new(&config)
    }

    /// Entries left in the temp dir.
    pub fn leftovers(&self) -> Vec<String> {
        fs::read_dir(&self.tmp)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Run the `cmuclmtk` binary against this sandbox's `bin` and `tmp`.
    ///
    /// `CMUCLMTK_HOME` points into the sandbox so no user config is read.
    pub fn run_cli(&self, args: &[&str], stdin: Option<&str>) -> Output {
        let home = self.path("home");
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmuclmtk"));
        cmd.arg("--bin-dir")
            .arg(&self.bin)
            .arg("--temp-dir")
            .arg(&self.tmp)
            .args(args)
            .env("CMUCLMTK_HOME", &home)
            .env("TMPDIR", &self.tmp)
            .env("NO_COLOR", "1")
            .env_remove("CMUCLMTK_BIN_DIR")
            .env_remove("RUST_LOG")
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().expect("spawn cmuclmtk");
        if let Some(text) = stdin {
            let mut pipe = child.stdin.take().expect("stdin pipe");
            pipe.write_all(text.as_bytes()).expect("write stdin");
        }
        child.wait_with_output().expect("wait for cmuclmtk")
    }
}

/// Panic with both streams if the CLI did not succeed.
pub fn assert_cli_success(output: &Output, args: &[&str]) {
    assert!(
        output.status.success(),
        "cmuclmtk {:?} failed ({:?})\nstdout:\n{}\nstderr:\n{}",
        args,
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn install_script(dir: &Path, name: &str, script: &str) {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Vocabulary words, skipping `##` comment lines.
pub fn vocab_words(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|l| !l.starts_with("##") && !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .collect()
}
