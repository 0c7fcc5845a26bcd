//! CLI command definitions

use crate::tasks::TaskName;
use clap::Subcommand;

/// Available commands
#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the linter
    Lint,

    /// Concatenate, minify and stamp the distributable bundle
    Bundle,

    /// Run the test suite once
    Test,

    /// Run tests and lint, then re-run them whenever sources change
    Watch,

    /// Generate static-analysis reports
    Report,

    /// Point versioned URLs in the docs at the current version
    UpdateVersionReferences,

    /// Run the full release sequence
    Release,

    /// Same as `watch`
    RunAll,
}

impl Command {
    /// The single task behind this command, if it is one
    pub fn task(self) -> Option<TaskName> {
        match self {
            Command::Lint => Some(TaskName::Lint),
            Command::Bundle => Some(TaskName::Bundle),
            Command::Test => Some(TaskName::Test),
            Command::Report => Some(TaskName::Report),
            Command::UpdateVersionReferences => Some(TaskName::UpdateVersionReferences),
            Command::Watch | Command::Release | Command::RunAll => None,
        }
    }
}
