//! Language models: `idngram2lm`, `binlm2arpa`.

use std::path::{Path, PathBuf};

use crate::artifact::{absolutize, Artifact};
use crate::error::Result;
use crate::runner::{Invocation, StdoutTarget};
use crate::tools::Tool;
use crate::Toolkit;

/// How out-of-vocabulary words are modeled (`-vocab_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocabType {
    /// Closed vocabulary, no `<UNK>`.
    Closed,
    /// Open vocabulary; `<UNK>` does not occur in the training data.
    #[default]
    OpenUnseenUnk,
    /// Open vocabulary; `<UNK>` occurs in the training data.
    OpenTrainedUnk,
}

impl VocabType {
    fn code(self) -> u8 {
        match self {
            VocabType::Closed => 0,
            VocabType::OpenUnseenUnk => 1,
            VocabType::OpenTrainedUnk => 2,
        }
    }
}

/// Language model output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LmFormat {
    #[default]
    Arpa,
    Binary,
}

impl LmFormat {
    fn flag(self) -> &'static str {
        match self {
            LmFormat::Arpa => "-arpa",
            LmFormat::Binary => "-binary",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            LmFormat::Arpa => ".lm",
            LmFormat::Binary => ".binlm",
        }
    }
}

/// Options for `idngram2lm`.
#[derive(Debug, Clone, PartialEq)]
pub struct Idngram2LmOptions {
    /// Context cues file (e.g. sentence boundary markers).
    pub context_file: Option<PathBuf>,
    pub vocab_type: VocabType,
    /// Share of the discount mass given to OOV words with `OpenUnseenUnk`.
    pub oov_fraction: f64,
    pub four_byte_counts: bool,
    pub min_unicount: u64,
    /// Fraction of a singleton's probability given to zerotons.
    pub zeroton_fraction: Option<f64>,
    pub n: u32,
    pub verbosity: u32,
    pub format: LmFormat,
    /// Read an ASCII rather than binary id n-gram file.
    pub ascii_input: bool,
}

impl Default for Idngram2LmOptions {
    fn default() -> Self {
        Self {
            context_file: None,
            vocab_type: VocabType::default(),
            oov_fraction: 0.5,
            four_byte_counts: false,
            min_unicount: 0,
            zeroton_fraction: None,
            n: 3,
            verbosity: 2,
            format: LmFormat::default(),
            ascii_input: false,
        }
    }
}

/// Options for `binlm2arpa`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binlm2ArpaOptions {
    pub verbosity: u32,
}

impl Default for Binlm2ArpaOptions {
    fn default() -> Self {
        Self { verbosity: 2 }
    }
}

impl Toolkit {
    /// Build a language model from an id n-gram file and its vocabulary.
    pub fn idngram2lm(
        &self,
        idngram: &Path,
        vocab: &Path,
        output: Option<&Path>,
        opts: &Idngram2LmOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Idngram2Lm)?;
        let idngram = absolutize(idngram)?;
        let vocab = absolutize(vocab)?;
        let context = opts.context_file.as_deref().map(absolutize).transpose()?;
        let target = self.temp().output_target(output, opts.format.suffix())?;

        let mut invocation = Invocation::new(Tool::Idngram2Lm)
            .opt_path("-idngram", &idngram)
            .opt_path("-vocab", &vocab)
            .opt("-vocab_type", opts.vocab_type.code())
            .opt("-oov_fraction", opts.oov_fraction)
            .opt("-min_unicount", opts.min_unicount)
            .opt("-verbosity", opts.verbosity)
            .opt("-n", opts.n)
            .opt_output(opts.format.flag(), target.path());
        if let Some(context) = &context {
            invocation = invocation.opt_path("-context", context);
        }
        if opts.four_byte_counts {
            invocation = invocation.flag("-four_byte_counts");
        }
        if let Some(fraction) = opts.zeroton_fraction {
            invocation = invocation.opt("-zeroton_fraction", fraction);
        }
        invocation = if opts.ascii_input {
            invocation.flag("-ascii_input")
        } else {
            invocation.flag("-bin_input")
        };
        let invocation = invocation.stdout(StdoutTarget::Capture);

        let output = self.execute(&program, &invocation)?;
        Ok(target.into_artifact(output.stdout))
    }

    /// Convert a binary language model into ARPA format.
    pub fn binlm2arpa(
        &self,
        input: &Path,
        output: Option<&Path>,
        opts: &Binlm2ArpaOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Binlm2Arpa)?;
        let input = absolutize(input)?;
        let target = self.temp().output_target(output, ".lm")?;

        let invocation = Invocation::new(Tool::Binlm2Arpa)
            .opt_path("-binary", &input)
            .opt_output("-arpa", target.path())
            .opt_nonzero("-verbosity", u64::from(opts.verbosity))
            .stdout(StdoutTarget::Capture);

        let output = self.execute(&program, &invocation)?;
        Ok(target.into_artifact(output.stdout))
    }
}
