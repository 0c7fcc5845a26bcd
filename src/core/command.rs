//! Command domain model

use std::fmt;
use std::path::{Path, PathBuf};

/// A single external program invocation
///
/// Commands are structured (program + argument list) and never handed to a
/// shell, so arguments containing spaces or quotes survive intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    allow_failure: bool,
}

impl Command {
    /// Create a command for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            allow_failure: false,
        }
    }

    /// Parse a shell-like line (`git commit -m "Release"`) into a command
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let words = shell_words::split(line).map_err(|e| CommandParseError::Syntax {
            line: line.to_string(),
            reason: e.to_string(),
        })?;

        let mut words = words.into_iter();
        let program = words.next().ok_or(CommandParseError::Empty)?;

        Ok(Self::new(program).args(words))
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command from `dir` instead of the current directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Tolerate a non-zero exit status for this command
    pub fn allow_failure(mut self, allow: bool) -> Self {
        self.allow_failure = allow;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn is_failure_allowed(&self) -> bool {
        self.allow_failure
    }

    /// Render the command as a quoted shell line, for logs only
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())?;
        if let Some(cwd) = &self.cwd {
            write!(f, " (in {})", cwd.display())?;
        }
        Ok(())
    }
}

/// Error parsing a command line from configuration
#[derive(Debug, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command line")]
    Empty,

    #[error("cannot parse command `{line}`: {reason}")]
    Syntax { line: String, reason: String },
}
