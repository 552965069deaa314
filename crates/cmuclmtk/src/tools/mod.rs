//! One primitive per CMUCLMTK binary.
//!
//! Each submodule adds methods to [`crate::Toolkit`] together with an
//! options struct whose `Default` matches the toolkit's documented defaults.

pub mod lm;
pub mod ngram;
pub mod vocab;

pub use lm::{Binlm2ArpaOptions, Idngram2LmOptions, LmFormat, VocabType};
pub use ngram::{
    Idngram2StatsOptions, IdngramOptions, MergeIdngramOptions, Ngram2MgramOptions, NgramFormat,
    Text2WngramOptions,
};
pub use vocab::{Text2WfreqOptions, VocabSize, Wfreq2VocabOptions};

use std::fmt;

/// The external binaries this crate drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Text2Wfreq,
    Wfreq2Vocab,
    Text2Wngram,
    Text2Idngram,
    Ngram2Mgram,
    Wngram2Idngram,
    Idngram2Stats,
    MergeIdngram,
    Idngram2Lm,
    Binlm2Arpa,
}

impl Tool {
    /// Every binary required for the full API.
    pub const ALL: [Tool; 10] = [
        Tool::Text2Wfreq,
        Tool::Wfreq2Vocab,
        Tool::Text2Wngram,
        Tool::Text2Idngram,
        Tool::Ngram2Mgram,
        Tool::Wngram2Idngram,
        Tool::Idngram2Stats,
        Tool::MergeIdngram,
        Tool::Idngram2Lm,
        Tool::Binlm2Arpa,
    ];

    /// Executable name as installed by CMUCLMTK.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::Text2Wfreq => "text2wfreq",
            Tool::Wfreq2Vocab => "wfreq2vocab",
            Tool::Text2Wngram => "text2wngram",
            Tool::Text2Idngram => "text2idngram",
            Tool::Ngram2Mgram => "ngram2mgram",
            Tool::Wngram2Idngram => "wngram2idngram",
            Tool::Idngram2Stats => "idngram2stats",
            Tool::MergeIdngram => "mergeidngram",
            Tool::Idngram2Lm => "idngram2lm",
            Tool::Binlm2Arpa => "binlm2arpa",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.binary_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_names_are_unique() {
        let mut names: Vec<&str> = Tool::ALL.iter().map(|t| t.binary_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Tool::ALL.len());
        assert_eq!(Tool::Wngram2Idngram.to_string(), "wngram2idngram");
    }
}
