//! Command-line interface

pub mod commands;
pub mod output;

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub use commands::Command;

/// Build, watch and release a JavaScript library
#[derive(Debug, Parser, Clone)]
#[command(name = "relay")]
#[command(author = "Relay Contributors")]
#[command(version)]
#[command(about = "Build, watch and release a JavaScript library", long_about = None)]
pub struct Cli {
    /// Task to run (defaults to `watch`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project configuration file
    #[arg(short, long, global = true, default_value = crate::core::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// The task to run, `watch` when none was given
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Watch)
    }
}
