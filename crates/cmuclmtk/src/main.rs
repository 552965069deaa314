//! cmuclmtk command-line front end
//!
//! Usage:
//!     cmuclmtk text2vocab --text "This is a test"
//!     cmuclmtk text2lm --input corpus.txt --output corpus.lm
//!     cmuclmtk check

use anyhow::{Context, Result};
use clap::Parser;
use cmuclmtk::{ClmtkConfig, Toolkit};
use cmuclmtk_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "cmuclmtk",
    version,
    about = "Run the CMU Sphinx Language Modeling Toolkit binaries"
)]
struct Cli {
    /// Config file (default: ~/.cmuclmtk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the CMUCLMTK binaries, searched before $PATH
    #[arg(long, global = true, env = "CMUCLMTK_BIN_DIR")]
    bin_dir: Option<PathBuf>,

    /// Directory for temporary files
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    /// Log every command line and the tools' stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(LogConfig {
        app_name: "cmuclmtk",
        verbose: args.verbose,
        log_to_file: config.logging.file,
    }) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let toolkit = Toolkit::new(&config);
    match cli::run(&toolkit, args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Cli) -> Result<ClmtkConfig> {
    let mut config = match &args.config {
        Some(path) => ClmtkConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClmtkConfig::load().context("Failed to load config")?,
    };
    if let Some(dir) = &args.bin_dir {
        config.toolkit.bin_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.temp_dir {
        config.temp.dir = Some(dir.clone());
    }
    Ok(config)
}
