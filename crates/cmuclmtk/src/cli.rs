//! Subcommands: one per toolkit binary, the two chains, `check` and `demo`.
//!
//! Without `--output`, the artifact is streamed to stdout and its temporary
//! file is removed afterwards.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use cmuclmtk::{
    Artifact, Binlm2ArpaOptions, Idngram2LmOptions, Idngram2StatsOptions, IdngramOptions,
    LmFormat, MergeIdngramOptions, Ngram2MgramOptions, NgramFormat, Text2LmOptions,
    Text2VocabOptions, Text2WfreqOptions, Text2WngramOptions, TextInput, Toolkit, VocabSize,
    VocabType, Wfreq2VocabOptions,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const DEMO_TEXT: &str = "This is a test";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that every CMUCLMTK binary can be found
    Check,

    /// Build a language model from a short text and verify the result
    Demo {
        #[arg(long, default_value = DEMO_TEXT)]
        text: String,
    },

    /// Count word occurrences in text
    Text2wfreq {
        #[command(flatten)]
        text: TextArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, default_value_t = 1_000_000)]
        hash: u64,
        #[arg(long, default_value_t = 2)]
        verbosity: u32,
    },

    /// Build a vocabulary from a word-frequency file
    Wfreq2vocab {
        /// Word-frequency file
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        size: VocabSizeArgs,
        #[arg(long, default_value_t = 1_000_000)]
        records: u64,
        #[arg(long, default_value_t = 2)]
        verbosity: u32,
    },

    /// Count word n-grams in text
    Text2wngram {
        #[command(flatten)]
        text: TextArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(short, long, default_value_t = 3)]
        n: u32,
        #[arg(long, default_value_t = 63_636_363)]
        chars: u64,
        #[arg(long, default_value_t = 9_090_909)]
        words: u64,
        #[arg(long)]
        compress: bool,
        #[arg(long, default_value_t = 2)]
        verbosity: u32,
    },

    /// Count id n-grams in text against a vocabulary
    Text2idngram {
        #[command(flatten)]
        text: TextArgs,
        #[arg(long)]
        vocab: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        idngram: IdngramArgs,
    },

    /// Reduce an n-gram file of order n to order m
    Ngram2mgram {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(short, long)]
        n: u32,
        #[arg(short, long)]
        m: u32,
        #[arg(long, value_enum, default_value_t = FormatArg::Binary)]
        format: FormatArg,
    },

    /// Map a word n-gram file onto vocabulary ids
    Wngram2idngram {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        vocab: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        idngram: IdngramArgs,
    },

    /// Frequency-of-frequency statistics of an id n-gram file
    Idngram2stats {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(short, long, default_value_t = 3)]
        n: u32,
        #[arg(long, default_value_t = 50)]
        fof_size: u64,
        #[arg(long, default_value_t = 2)]
        verbosity: u32,
        #[arg(long)]
        ascii_input: bool,
    },

    /// Merge id n-gram files
    Mergeidngram {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(short, long, default_value_t = 3)]
        n: u32,
        #[arg(long)]
        ascii_input: bool,
        #[arg(long)]
        ascii_output: bool,
    },

    /// Estimate a language model from an id n-gram file
    Idngram2lm {
        #[arg(long)]
        idngram: PathBuf,
        #[arg(long)]
        vocab: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        lm: LmArgs,
    },

    /// Convert a binary language model to ARPA format
    Binlm2arpa {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, default_value_t = 2)]
        verbosity: u32,
    },

    /// text2wfreq followed by wfreq2vocab
    Text2vocab {
        #[command(flatten)]
        text: TextArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        size: VocabSizeArgs,
    },

    /// Text (and optional vocabulary) straight to a language model
    Text2lm {
        #[command(flatten)]
        text: TextArgs,
        /// Existing vocabulary; built from the text if omitted
        #[arg(long)]
        vocab: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        lm: LmArgs,
    },
}

/// Text source: `--text`, `--input`, or stdin when neither is given.
#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to process
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// File containing the text to process
    #[arg(long)]
    input: Option<PathBuf>,
}

impl TextArgs {
    fn into_input(self) -> Result<TextInput> {
        match (self.text, self.input) {
            (Some(text), _) => Ok(TextInput::Text(text)),
            (None, Some(path)) => Ok(TextInput::File(path)),
            (None, None) => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read text from stdin")?;
                Ok(TextInput::Text(text))
            }
        }
    }
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output file; the result is written to stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VocabSizeArgs {
    /// Keep the N most common words
    #[arg(long, conflicts_with = "gt")]
    top: Option<u64>,

    /// Keep words occurring more than N times
    #[arg(long)]
    gt: Option<u64>,
}

impl VocabSizeArgs {
    fn size(&self) -> VocabSize {
        match (self.top, self.gt) {
            (Some(n), _) => VocabSize::Top(n),
            (None, Some(n)) => VocabSize::MoreThan(n),
            (None, None) => VocabSize::ToolDefault,
        }
    }
}

#[derive(Args, Debug)]
pub struct IdngramArgs {
    #[arg(long, default_value_t = 100)]
    buffer: u64,
    #[arg(long, default_value_t = 2_000_000)]
    hash: u64,
    #[arg(long, default_value_t = 20)]
    files: u64,
    #[arg(long)]
    compress: bool,
    #[arg(long, default_value_t = 2)]
    verbosity: u32,
    #[arg(short, long, default_value_t = 3)]
    n: u32,
    #[arg(long)]
    write_ascii: bool,
    #[arg(long, default_value_t = 10)]
    fof_size: u64,
}

impl IdngramArgs {
    fn options(&self) -> IdngramOptions {
        IdngramOptions {
            buffersize: self.buffer,
            hashtablesize: self.hash,
            files: self.files,
            compress: self.compress,
            verbosity: self.verbosity,
            n: self.n,
            write_ascii: self.write_ascii,
            fof_size: self.fof_size,
        }
    }
}

#[derive(Args, Debug)]
pub struct LmArgs {
    /// Context cues file
    #[arg(long)]
    context: Option<PathBuf>,
    /// 0 = closed, 1 = open (<UNK> unseen), 2 = open (<UNK> in training data)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    vocab_type: u8,
    #[arg(long, default_value_t = 0.5)]
    oov_fraction: f64,
    #[arg(long)]
    four_byte_counts: bool,
    #[arg(long, default_value_t = 0)]
    min_unicount: u64,
    #[arg(long)]
    zeroton_fraction: Option<f64>,
    #[arg(short, long, default_value_t = 3)]
    n: u32,
    #[arg(long, default_value_t = 2)]
    verbosity: u32,
    /// Write a binary model instead of ARPA
    #[arg(long)]
    binary: bool,
    #[arg(long)]
    ascii_input: bool,
}

impl LmArgs {
    fn options(&self) -> Idngram2LmOptions {
        Idngram2LmOptions {
            context_file: self.context.clone(),
            vocab_type: match self.vocab_type {
                0 => VocabType::Closed,
                2 => VocabType::OpenTrainedUnk,
                _ => VocabType::OpenUnseenUnk,
            },
            oov_fraction: self.oov_fraction,
            four_byte_counts: self.four_byte_counts,
            min_unicount: self.min_unicount,
            zeroton_fraction: self.zeroton_fraction,
            n: self.n,
            verbosity: self.verbosity,
            format: if self.binary {
                LmFormat::Binary
            } else {
                LmFormat::Arpa
            },
            ascii_input: self.ascii_input,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Words,
    Ascii,
    Binary,
}

impl From<FormatArg> for NgramFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Words => NgramFormat::Words,
            FormatArg::Ascii => NgramFormat::AsciiIdngram,
            FormatArg::Binary => NgramFormat::BinaryIdngram,
        }
    }
}

pub fn run(toolkit: &Toolkit, command: Command) -> Result<ExitCode> {
    match command {
        Command::Check => Ok(check(toolkit)),
        Command::Demo { text } => demo(toolkit, &text),
        Command::Text2wfreq {
            text,
            output,
            hash,
            verbosity,
        } => {
            let opts = Text2WfreqOptions {
                hashtablesize: hash,
                verbosity,
            };
            let artifact = toolkit.text2wfreq(text.into_input()?, output.output.as_deref(), &opts)?;
            emit(artifact)
        }
        Command::Wfreq2vocab {
            input,
            output,
            size,
            records,
            verbosity,
        } => {
            let opts = Wfreq2VocabOptions {
                size: size.size(),
                records,
                verbosity,
            };
            emit(toolkit.wfreq2vocab(&input, output.output.as_deref(), &opts)?)
        }
        Command::Text2wngram {
            text,
            output,
            n,
            chars,
            words,
            compress,
            verbosity,
        } => {
            let opts = Text2WngramOptions {
                n,
                chars,
                words,
                compress,
                verbosity,
            };
            emit(toolkit.text2wngram(text.into_input()?, output.output.as_deref(), &opts)?)
        }
        Command::Text2idngram {
            text,
            vocab,
            output,
            idngram,
        } => emit(toolkit.text2idngram(
            text.into_input()?,
            &vocab,
            output.output.as_deref(),
            &idngram.options(),
        )?),
        Command::Ngram2mgram {
            input,
            output,
            n,
            m,
            format,
        } => {
            let opts = Ngram2MgramOptions {
                n,
                m,
                format: format.into(),
            };
            emit(toolkit.ngram2mgram(&input, output.output.as_deref(), &opts)?)
        }
        Command::Wngram2idngram {
            input,
            vocab,
            output,
            idngram,
        } => emit(toolkit.wngram2idngram(
            &input,
            &vocab,
            output.output.as_deref(),
            &idngram.options(),
        )?),
        Command::Idngram2stats {
            input,
            output,
            n,
            fof_size,
            verbosity,
            ascii_input,
        } => {
            let opts = Idngram2StatsOptions {
                n,
                fof_size,
                verbosity,
                ascii_input,
            };
            emit(toolkit.idngram2stats(&input, output.output.as_deref(), &opts)?)
        }
        Command::Mergeidngram {
            inputs,
            output,
            n,
            ascii_input,
            ascii_output,
        } => {
            let opts = MergeIdngramOptions {
                n,
                ascii_input,
                ascii_output,
            };
            emit(toolkit.mergeidngram(&inputs, output.output.as_deref(), &opts)?)
        }
        Command::Idngram2lm {
            idngram,
            vocab,
            output,
            lm,
        } => emit(toolkit.idngram2lm(&idngram, &vocab, output.output.as_deref(), &lm.options())?),
        Command::Binlm2arpa {
            input,
            output,
            verbosity,
        } => emit(toolkit.binlm2arpa(
            &input,
            output.output.as_deref(),
            &Binlm2ArpaOptions { verbosity },
        )?),
        Command::Text2vocab { text, output, size } => {
            let opts = Text2VocabOptions {
                vocab: Wfreq2VocabOptions {
                    size: size.size(),
                    ..Default::default()
                },
                ..Default::default()
            };
            emit(toolkit.text2vocab(text.into_input()?, output.output.as_deref(), &opts)?)
        }
        Command::Text2lm {
            text,
            vocab,
            output,
            lm,
        } => {
            let opts = Text2LmOptions {
                lm: lm.options(),
                ..Default::default()
            };
            let result = toolkit.text2lm(
                text.into_input()?,
                output.output.as_deref(),
                vocab.as_deref(),
                &opts,
            )?;
            emit(result.model)
        }
    }
}

fn check(toolkit: &Toolkit) -> ExitCode {
    let report = toolkit.check_installation();
    for (tool, path) in &report.found {
        println!("{:<16} {}", tool, path.display());
    }
    for tool in &report.missing {
        println!("{:<16} MISSING", tool);
    }
    if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Build an LM from `text` in a scratch directory and check it is non-empty.
fn demo(toolkit: &Toolkit, text: &str) -> Result<ExitCode> {
    let dir = tempfile::Builder::new()
        .prefix("cmuclmtk-demo-")
        .tempdir()
        .context("Failed to create demo directory")?;
    info!("Created temporary directory: '{}'", dir.path().display());
    info!("Creating languagemodel from text '{}'", text);

    let lm_file = dir.path().join("test.lm");
    info!("Languagemodel will be written to: '{}'", lm_file.display());

    let result = toolkit.text2lm(text, Some(lm_file.as_path()), None, &Text2LmOptions::default())?;
    info!("Languagemodel creation finished.");

    let ok = model_looks_valid(result.model.path())?;
    drop(result);

    let dir_path = dir.path().to_path_buf();
    dir.close()
        .with_context(|| format!("Failed to remove {}", dir_path.display()))?;
    info!("Removed temporary directory: '{}'", dir_path.display());
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn model_looks_valid(path: &Path) -> Result<bool> {
    if !path.exists() {
        error!("Languagemodel file '{}' does not exist!", path.display());
        return Ok(false);
    }
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if size == 0 {
        error!("Languagemodel file '{}' is empty!", path.display());
        return Ok(false);
    }
    info!("Languagemodel file '{}' seems to be okay.", path.display());
    Ok(true)
}

/// Write a temporary artifact to stdout; report the path of a kept one.
fn emit(artifact: Artifact) -> Result<ExitCode> {
    for line in artifact.report().lines().filter(|l| !l.trim().is_empty()) {
        info!("{}", line);
    }
    if artifact.is_temporary() {
        let mut file = std::fs::File::open(artifact.path())
            .with_context(|| format!("Failed to open {}", artifact.path().display()))?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        io::copy(&mut file, &mut out).context("Failed to write result to stdout")?;
        out.flush()?;
    } else {
        let path = artifact.keep()?;
        info!("Wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
