//! Wrapper for the CMU Sphinx Language Modeling Toolkit (CMUCLMTK).
//!
//! Every toolkit binary gets one method on [`Toolkit`]; [`Toolkit::text2vocab`]
//! and [`Toolkit::text2lm`] chain several of them. No modeling happens in
//! this crate: it prepares files, runs the binaries and cleans up.
//!
//! ```rust,ignore
//! use cmuclmtk::{ClmtkConfig, Toolkit, Text2VocabOptions};
//!
//! let toolkit = Toolkit::new(&ClmtkConfig::load()?);
//! let vocab = toolkit.text2vocab("This is a test", None, &Text2VocabOptions::default())?;
//! println!("{}", vocab.read_to_string()?);
//! // vocab is a temporary file and is deleted here
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod runner;
pub mod shortcuts;
pub mod tools;
pub mod toolkit;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{Artifact, TempSpace, TextInput};
pub use config::ClmtkConfig;
pub use error::{ClmtkError, Result};
pub use runner::{Invocation, StdinSource, StdoutTarget, SystemRunner, ToolOutput, ToolRunner};
pub use shortcuts::{LanguageModel, Text2LmOptions, Text2VocabOptions};
pub use toolkit::{InstallationReport, Toolkit};
pub use tools::{
    Binlm2ArpaOptions, Idngram2LmOptions, Idngram2StatsOptions, IdngramOptions, LmFormat,
    MergeIdngramOptions, Ngram2MgramOptions, NgramFormat, Text2WfreqOptions, Text2WngramOptions,
    Tool, VocabSize, VocabType, Wfreq2VocabOptions,
};
