//! Chains of primitives.
//!
//! Intermediate artifacts are temporaries owned by the chain; they are
//! dropped (and deleted) when the chain returns, whether it succeeded or
//! not. All binaries a chain needs are resolved before any file is written.

use std::path::Path;
use tracing::info;

use crate::artifact::{Artifact, TextInput};
use crate::error::Result;
use crate::tools::{
    Idngram2LmOptions, IdngramOptions, Text2WfreqOptions, Tool, Wfreq2VocabOptions,
};
use crate::Toolkit;

/// Options for [`Toolkit::text2vocab`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text2VocabOptions {
    pub wfreq: Text2WfreqOptions,
    pub vocab: Wfreq2VocabOptions,
}

/// Options for [`Toolkit::text2lm`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text2LmOptions {
    /// Used only when no vocabulary file is supplied.
    pub vocab: Text2VocabOptions,
    pub idngram: IdngramOptions,
    pub lm: Idngram2LmOptions,
}

/// Result of [`Toolkit::text2lm`].
#[derive(Debug)]
pub struct LanguageModel {
    /// The model; its report is the `idngram2lm` output.
    pub model: Artifact,
    /// What `text2idngram` printed (frequency-of-frequency table).
    pub idngram_report: String,
}

impl Toolkit {
    /// text → word frequencies → vocabulary.
    pub fn text2vocab(
        &self,
        text: impl Into<TextInput>,
        output: Option<&Path>,
        opts: &Text2VocabOptions,
    ) -> Result<Artifact> {
        self.require(&[Tool::Text2Wfreq, Tool::Wfreq2Vocab])?;
        let input = self.temp().prepare_text(&text.into())?;
        self.vocab_from_file(input.path(), output, opts)
    }

    fn vocab_from_file(
        &self,
        text: &Path,
        output: Option<&Path>,
        opts: &Text2VocabOptions,
    ) -> Result<Artifact> {
        info!("Counting word frequencies");
        let wfreq = self.text2wfreq(text, None, &opts.wfreq)?;
        info!("Building vocabulary");
        self.wfreq2vocab(wfreq.path(), output, &opts.vocab)
    }

    /// text (+ optional vocabulary) → id n-grams → language model.
    ///
    /// Without `vocab`, a temporary vocabulary is built from the same text.
    pub fn text2lm(
        &self,
        text: impl Into<TextInput>,
        output: Option<&Path>,
        vocab: Option<&Path>,
        opts: &Text2LmOptions,
    ) -> Result<LanguageModel> {
        if vocab.is_none() {
            self.require(&[Tool::Text2Wfreq, Tool::Wfreq2Vocab])?;
        }
        self.require(&[Tool::Text2Idngram, Tool::Idngram2Lm])?;

        let input = self.temp().prepare_text(&text.into())?;

        let built_vocab;
        let vocab_path = match vocab {
            Some(path) => path,
            None => {
                built_vocab = self.vocab_from_file(input.path(), None, &opts.vocab)?;
                built_vocab.path()
            }
        };

        info!("Counting id n-grams");
        let idngram = self.text2idngram(input.path(), vocab_path, None, &opts.idngram)?;

        info!("Estimating language model");
        let model = self.idngram2lm(idngram.path(), vocab_path, output, &opts.lm)?;

        Ok(LanguageModel {
            model,
            idngram_report: idngram.report().to_string(),
        })
    }

    fn require(&self, tools: &[Tool]) -> Result<()> {
        for tool in tools {
            self.locate(*tool)?;
        }
        Ok(())
    }
}
