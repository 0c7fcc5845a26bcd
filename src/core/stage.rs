//! Stage domain model

use crate::core::Command;

/// An ordered group of commands that succeeds only if every command does
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Stable stage name (`sync-repository`), used in logs and errors
    pub name: String,

    /// Progress label shown to the operator before the stage runs
    pub label: String,

    /// Commands, executed in order
    pub commands: Vec<Command>,
}

impl Stage {
    /// Create an empty stage whose label defaults to its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            commands: Vec::new(),
        }
    }

    /// Set the progress label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Append a command
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Append several commands
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
