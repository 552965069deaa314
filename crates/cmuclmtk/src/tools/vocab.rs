//! Word frequencies and vocabularies: `text2wfreq`, `wfreq2vocab`.

use std::path::Path;

use crate::artifact::{Artifact, TextInput};
use crate::error::Result;
use crate::runner::{Invocation, StdinSource, StdoutTarget};
use crate::tools::Tool;
use crate::Toolkit;

/// Options for `text2wfreq`.
///
/// A larger hash table costs memory but can reduce computation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text2WfreqOptions {
    pub hashtablesize: u64,
    pub verbosity: u32,
}

impl Default for Text2WfreqOptions {
    fn default() -> Self {
        Self {
            hashtablesize: 1_000_000,
            verbosity: 2,
        }
    }
}

/// How `wfreq2vocab` decides which words to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocabSize {
    /// Tool default: the 20,000 most common words.
    #[default]
    ToolDefault,
    /// The N most common words (`-top N`).
    Top(u64),
    /// Words occurring more than N times (`-gt N`).
    MoreThan(u64),
}

/// Options for `wfreq2vocab`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wfreq2VocabOptions {
    pub size: VocabSize,
    /// Word/count records to allocate memory for. The tool fails if the
    /// input holds more words than this.
    pub records: u64,
    pub verbosity: u32,
}

impl Default for Wfreq2VocabOptions {
    fn default() -> Self {
        Self {
            size: VocabSize::ToolDefault,
            records: 1_000_000,
            verbosity: 2,
        }
    }
}

impl Toolkit {
    /// List every word in the text with its number of occurrences.
    ///
    /// The output is not sorted; `wfreq2vocab` does not need it to be.
    pub fn text2wfreq(
        &self,
        text: impl Into<TextInput>,
        output: Option<&Path>,
        opts: &Text2WfreqOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Text2Wfreq)?;
        let input = self.temp().prepare_text(&text.into())?;
        let target = self.temp().output_target(output, ".wfreq")?;

        let invocation = Invocation::new(Tool::Text2Wfreq)
            .opt("-hash", opts.hashtablesize)
            .opt("-verbosity", opts.verbosity)
            .stdin(StdinSource::File(input.path().to_path_buf()))
            .stdout(StdoutTarget::File(target.path().to_path_buf()));

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }

    /// Turn a word-frequency file into a sorted vocabulary file.
    pub fn wfreq2vocab(
        &self,
        wfreq: &Path,
        output: Option<&Path>,
        opts: &Wfreq2VocabOptions,
    ) -> Result<Artifact> {
        let program = self.locate(Tool::Wfreq2Vocab)?;
        let target = self.temp().output_target(output, ".vocab")?;

        let mut invocation = Invocation::new(Tool::Wfreq2Vocab)
            .opt("-verbosity", opts.verbosity)
            .opt("-records", opts.records);
        invocation = match opts.size {
            VocabSize::ToolDefault => invocation,
            VocabSize::Top(n) => invocation.opt("-top", n),
            VocabSize::MoreThan(n) => invocation.opt("-gt", n),
        };
        let invocation = invocation
            .stdin(StdinSource::File(wfreq.to_path_buf()))
            .stdout(StdoutTarget::File(target.path().to_path_buf()));

        self.execute(&program, &invocation)?;
        Ok(target.into_artifact(String::new()))
    }
}
