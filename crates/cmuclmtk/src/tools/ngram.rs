//! N-gram tools: `text2wngram`, `text2idngram`, `ngram2mgram`,
//! `wngram2idngram`, `idngram2stats`, `mergeidngram`.
//!
//! The tools that spill temporary files into their working directory run
//! inside a scoped workdir, so all paths given to them are absolute.

use std::path::{Path, PathBuf};

use crate::artifact::{absolutize, Artifact, TextInput};
use crate::error::{ClmtkError, Result};
use crate::runner::{Invocation, StdinSource, StdoutTarget};
use crate::tools::Tool;
use crate::Toolkit;

/// Options for `text2wngram`.
///
/// `chars` and `words` bound the buffer the tool sorts n-grams in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text2WngramOptions {
    pub n: u32,
    pub chars: u64,
    pub words: u64,
    pub compress: bool,
    pub verbosity: u32,
}

impl Default for Text2WngramOptions {
    fn default() -> Self {
        Self {
            n: 3,
            chars: 63_636_363,
            words: 9_090_909,
            compress: false,
            verbosity: 2,
        }
    }
}

/// Options shared by `text2idngram` and `wngram2idngram`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdngramOptions {
    /// Sort buffer size in megabytes.
    pub buffersize: u64,
    pub hashtablesize: u64,
    /// Temporary files the tool may keep open at once while merging.
    pub files: u64,
    pub compress: bool,
    pub verbosity: u32,
    pub n: u32,
    /// Write ASCII instead of binary id n-grams.
    pub write_ascii: bool,
    /// Length of the frequency-of-frequency list in the report. 0 disables it.
    pub fof_size: u64,
}

impl Default for IdngramOptions {
    fn default() -> Self {
        Self {
            buffersize: 100,
            hashtablesize: 2_000_000,
            files: 20,
            compress: false,
            verbosity: 2,
            n: 3,
            write_ascii: false,
            fof_size: 10,
        }
    }
}

impl IdngramOptions {
    fn apply(&self, invocation: Invocation) -> Invocation {
        let mut invocation = invocation
            .opt_nonzero("-buffer", self.buffersize)
            .opt_nonzero("-hash", self.hashtablesize)
            .opt_nonzero("-files", self.files)
            .opt_nonzero("-verbosity", u64::from(self.verbosity))
            .opt_nonzero("-n", u64::from(self.n))
            .opt_nonzero("-fof_size", self.fof_size);
        if self.compress {
            invocation = invocation.flag("-compress");
        }
        if self.write_ascii {
            invocation = invocation.flag("-write_ascii");
        }
        invocation
    }
}

/// File format handled by `ngram2mgram`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NgramFormat {
    /// Word n-grams (`-words`).
    Words,
    /// ASCII id n-grams (`-ascii`).
    AsciiIdngram,
    /// Binary id n-grams (`-binary`).
    #[default]
    BinaryIdngram,
}

/// Options for `ngram2mgram`. Requires `1 <= m < n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ngram2MgramOptions {
    pub n: u32,
    pub m: u32,
    pub format: NgramFormat,
}

/// Options for `idngram2stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Idngram2StatsOptions {
    pub n: u32,
    pub fof_size: u64,
    pub verbosity: u32,
    pub ascii_input: bool,
}

impl Default for Idngram2StatsOptions {
    fn default() -> Self {
        Self {
            n: 3,
            fof_size: 50,
            verbosity: 2,
            ascii_input: false,
        }
    }
}

/// Options for `mergeidngram`. Inputs must all share one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeIdngramOptions {
    pub n: u32,
    pub ascii_input: bool,
    pub ascii_output: bool,
}

impl Default for MergeIdngramOptions {
    fn default() -> Self {
        Self {
            n: 3,
            ascii_input: false,
            ascii_output: false,
        }
    }
}

impl Toolkit {
    /// List every word n-gram in the text with its number of occurrences.
    pub fn text2wngram(
        &self,
        text: impl Into<TextInput>,
        output: Option<&Path>,
        opts: &Text2WngramOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Text2Wngram)?;
        let input = self.temp().prepare_text(&text.into())?;
        let target = self.temp().output_target(output, ".wngram")?;
        let workdir = self.temp().workdir()?;

        let mut invocation = Invocation::new(Tool::Text2Wngram)
            .opt_nonzero("-n", u64::from(opts.n))
            .opt_nonzero("-chars", opts.chars)
            .opt_nonzero("-words", opts.words);
        if opts.compress {
            invocation = invocation.flag("-compress");
        }
        let invocation = invocation
            .opt_nonzero("-verbosity", u64::from(opts.verbosity))
            .stdin(StdinSource::File(input.path().to_path_buf()))
            .stdout(StdoutTarget::File(target.path().to_path_buf()))
            .current_dir(workdir.path());

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }

    /// Map the text onto vocabulary ids and count id n-grams.
    ///
    /// The artifact's report holds the frequency-of-frequency table the tool
    /// prints, useful for choosing `idngram2lm` cutoffs.
    pub fn text2idngram(
        &self,
        text: impl Into<TextInput>,
        vocab: &Path,
        output: Option<&Path>,
        opts: &IdngramOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Text2Idngram)?;
        let vocab = absolutize(vocab)?;
        let input = self.temp().prepare_text(&text.into())?;
        let target = self.temp().output_target(output, ".idngram")?;
        let workdir = self.temp().workdir()?;

        let invocation = Invocation::new(Tool::Text2Idngram)
            .opt_path("-vocab", &vocab)
            .opt_output("-idngram", target.path());
        let invocation = opts
            .apply(invocation)
            .stdin(StdinSource::File(input.path().to_path_buf()))
            .stdout(StdoutTarget::Capture)
            .current_dir(workdir.path());

        let output = self.execute(&program, &invocation)?;
        Ok(target.into_artifact(output.stdout))
    }

    /// Convert an n-gram file of order `n` into one of order `m`.
    pub fn ngram2mgram(
        &self,
        input: &Path,
        output: Option<&Path>,
        opts: &Ngram2MgramOptions,
    ) -> Result<Artifact> {
        let tool = Tool::Ngram2Mgram;
        if opts.m == 0 || opts.m >= opts.n {
            return Err(ClmtkError::invalid(
                tool.binary_name(),
                format!("m must satisfy 1 <= m < n (got n={}, m={})", opts.n, opts.m),
            ));
        }
        let program = self.locate(tool)?;
        let suffix = match opts.format {
            NgramFormat::Words => ".wngram",
            NgramFormat::AsciiIdngram | NgramFormat::BinaryIdngram => ".idngram",
        };
        let target = self.temp().output_target(output, suffix)?;

        let format_flag = match opts.format {
            NgramFormat::Words => "-words",
            NgramFormat::AsciiIdngram => "-ascii",
            NgramFormat::BinaryIdngram => "-binary",
        };
        let invocation = Invocation::new(tool)
            .opt("-n", opts.n)
            .opt("-m", opts.m)
            .flag(format_flag)
            .stdin(StdinSource::File(input.to_path_buf()))
            .stdout(StdoutTarget::File(target.path().to_path_buf()));

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }

    /// Map a word n-gram file onto vocabulary ids.
    ///
    /// The vocabulary must be sorted alphabetically, which vocabularies from
    /// `wfreq2vocab` already are.
    pub fn wngram2idngram(
        &self,
        input: &Path,
        vocab: &Path,
        output: Option<&Path>,
        opts: &IdngramOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Wngram2Idngram)?;
        let vocab = absolutize(vocab)?;
        let input = absolutize(input)?;
        let target = self.temp().output_target(output, ".idngram")?;
        let workdir = self.temp().workdir()?;

        let invocation = Invocation::new(Tool::Wngram2Idngram)
            .opt_path("-vocab", &vocab)
            .opt_output("-idngram", target.path());
        let invocation = opts
            .apply(invocation)
            .stdin(StdinSource::File(input))
            .stdout(StdoutTarget::Capture)
            .current_dir(workdir.path());

        let output = self.execute(&program, &invocation)?;
        Ok(target.into_artifact(output.stdout))
    }

    /// Frequency-of-frequencies for each n-gram order of an id n-gram file.
    pub fn idngram2stats(
        &self,
        input: &Path,
        output: Option<&Path>,
        opts: &Idngram2StatsOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Idngram2Stats)?;
        let target = self.temp().output_target(output, ".stats")?;

        let mut invocation = Invocation::new(Tool::Idngram2Stats)
            .opt_nonzero("-n", u64::from(opts.n))
            .opt_nonzero("-fof_size", opts.fof_size)
            .opt_nonzero("-verbosity", u64::from(opts.verbosity));
        if opts.ascii_input {
            invocation = invocation.flag("-ascii_input");
        }
        let invocation = invocation
            .stdin(StdinSource::File(input.to_path_buf()))
            .stdout(StdoutTarget::File(target.path().to_path_buf()));

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }

    /// Merge several id n-gram files. Also converts between ASCII and binary.
    pub fn mergeidngram(
        &self,
        inputs: &[PathBuf],
        output: Option<&Path>,
        opts: &MergeIdngramOptions,
    ) -> Result<Artifact> {
        let tool = Tool::MergeIdngram;
        if inputs.is_empty() {
            return Err(ClmtkError::invalid(
                tool.binary_name(),
                "at least one input file is required",
            ));
        }
        let program = self.locate(tool)?;
        let target = self.temp().output_target(output, ".idngram")?;

        let mut invocation = Invocation::new(tool).opt_nonzero("-n", u64::from(opts.n));
        if opts.ascii_input {
            invocation = invocation.flag("-ascii_input");
        }
        if opts.ascii_output {
            invocation = invocation.flag("-ascii_output");
        }
        for input in inputs {
            invocation = invocation.positional(absolutize(input)?);
        }
        let invocation = invocation.stdout(StdoutTarget::File(target.path().to_path_buf()));

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    fn setup() -> (tempfile::TempDir, RecordingRunner, Toolkit) {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let tk = Toolkit::with_runner(runner.clone(), Some(dir.path().to_path_buf()));
        (dir, runner, tk)
    }

    #[test]
    fn test_text2wngram_runs_in_scratch_dir() {
        let (dir, runner, tk) = setup();

        tk.text2wngram("a b c d", None, &Text2WngramOptions::default())
            .unwrap();

        let call = &runner.calls()[0];
        assert_eq!(
            call.args_lossy(),
            vec!["-n", "3", "-chars", "63636363", "-words", "9090909", "-verbosity", "2"]
        );
        let workdir = call.current_dir.clone().unwrap();
        assert!(workdir.starts_with(dir.path()));
        assert!(!workdir.exists(), "scratch dir should be removed after the call");
    }

    #[test]
    fn test_text2idngram_passes_absolute_paths_and_keeps_report() {
        let (dir, runner, tk) = setup();
        let runner = runner.stdout(Tool::Text2Idngram, "fof table\n");
        let vocab = dir.path().join("a.vocab");
        std::fs::write(&vocab, "a\nb\n").unwrap();

        let opts = IdngramOptions {
            write_ascii: true,
            files: 0,
            ..Default::default()
        };
        let idngram = tk.text2idngram("a b", &vocab, None, &opts).unwrap();

        let args = runner.calls()[0].args_lossy();
        assert_eq!(args[0], "-vocab");
        assert_eq!(args[1], vocab.display().to_string());
        assert_eq!(args[2], "-idngram");
        assert_eq!(args[3], idngram.path().display().to_string());
        assert!(Path::new(&args[3]).is_absolute());
        assert_eq!(
            &args[4..],
            &[
                "-buffer", "100", "-hash", "2000000", "-verbosity", "2", "-n", "3",
                "-fof_size", "10", "-write_ascii"
            ]
        );
        assert_eq!(idngram.report(), "fof table\n");
    }

    #[test]
    fn test_ngram2mgram_format_flags() {
        let (dir, runner, tk) = setup();
        let input = dir.path().join("in.wngram");
        std::fs::write(&input, "").unwrap();

        let opts = Ngram2MgramOptions {
            n: 3,
            m: 2,
            format: NgramFormat::Words,
        };
        let out = tk.ngram2mgram(&input, None, &opts).unwrap();
        assert!(out.path().to_string_lossy().ends_with(".wngram"));
        assert_eq!(runner.calls()[0].args_lossy(), vec!["-n", "3", "-m", "2", "-words"]);

        let opts = Ngram2MgramOptions {
            n: 4,
            m: 2,
            format: NgramFormat::default(),
        };
        tk.ngram2mgram(&input, None, &opts).unwrap();
        assert_eq!(runner.calls()[1].args_lossy(), vec!["-n", "4", "-m", "2", "-binary"]);
    }

    #[test]
    fn test_ngram2mgram_rejects_m_not_below_n() {
        let (dir, runner, tk) = setup();
        let input = dir.path().join("in.idngram");

        let opts = Ngram2MgramOptions {
            n: 2,
            m: 2,
            format: NgramFormat::AsciiIdngram,
        };
        let err = tk.ngram2mgram(&input, None, &opts).unwrap_err();
        assert!(matches!(err, ClmtkError::InvalidArgument { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_wngram2idngram_reads_word_ngrams_on_stdin() {
        let (dir, runner, tk) = setup();
        let input = dir.path().join("in.wngram");
        let vocab = dir.path().join("in.vocab");
        std::fs::write(&input, "a b c 1\n").unwrap();
        std::fs::write(&vocab, "a\nb\nc\n").unwrap();

        tk.wngram2idngram(&input, &vocab, None, &IdngramOptions::default())
            .unwrap();

        let call = &runner.calls()[0];
        assert_eq!(call.tool, Tool::Wngram2Idngram);
        assert_eq!(call.stdin, StdinSource::File(input.clone()));
        assert_eq!(call.stdout, StdoutTarget::Capture);
        assert_eq!(runner.stdin_seen()[0].as_deref(), Some("a b c 1\n"));
    }

    #[test]
    fn test_idngram2stats_flags() {
        let (dir, runner, tk) = setup();
        let input = dir.path().join("in.idngram");
        std::fs::write(&input, "").unwrap();

        let opts = Idngram2StatsOptions {
            ascii_input: true,
            ..Default::default()
        };
        tk.idngram2stats(&input, None, &opts).unwrap();
        assert_eq!(
            runner.calls()[0].args_lossy(),
            vec!["-n", "3", "-fof_size", "50", "-verbosity", "2", "-ascii_input"]
        );
    }

    #[test]
    fn test_mergeidngram_requires_inputs() {
        let (_dir, runner, tk) = setup();
        let err = tk
            .mergeidngram(&[], None, &MergeIdngramOptions::default())
            .unwrap_err();
        assert!(matches!(err, ClmtkError::InvalidArgument { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_mergeidngram_appends_inputs_after_flags() {
        let (dir, runner, tk) = setup();
        let a = dir.path().join("a.idngram");
        let b = dir.path().join("b.idngram");

        let opts = MergeIdngramOptions {
            ascii_output: true,
            ..Default::default()
        };
        tk.mergeidngram(&[a.clone(), b.clone()], None, &opts).unwrap();

        let call = &runner.calls()[0];
        assert_eq!(
            call.args_lossy(),
            vec![
                "-n".to_string(),
                "3".to_string(),
                "-ascii_output".to_string(),
                a.display().to_string(),
                b.display().to_string(),
            ]
        );
        assert_eq!(call.stdin, StdinSource::Null);
    }
}
