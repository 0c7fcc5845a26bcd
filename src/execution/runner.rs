//! Command runners - spawn one external process per command

use crate::core::Command;
use crate::execution::SpawnError;
use async_trait::async_trait;
use std::process::Stdio;
use tracing::{debug, info};

/// How a started process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for command execution - allows for different implementations
///
/// A runner only reports how the process ended. Deciding whether a non-zero
/// exit is fatal is left to the caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &Command) -> Result<CommandOutcome, SpawnError>;
}

/// Runs commands as child processes attached to the controlling terminal
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    /// Spawn the command with inherited stdin/stdout/stderr and wait for it
    ///
    /// There is no timeout: an unresponsive child stalls the caller until
    /// it exits or the whole process is terminated.
    async fn run(&self, command: &Command) -> Result<CommandOutcome, SpawnError> {
        debug!("Spawning: {}", command);

        let mut process = tokio::process::Command::new(command.program());
        process
            .args(command.arguments())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = command.cwd() {
            process.current_dir(dir);
        }

        let status = process
            .status()
            .await
            .map_err(|source| SpawnError {
                command: command.display(),
                source,
            })?;

        debug!("`{}` exited with {:?}", command.display(), status.code());

        Ok(CommandOutcome {
            code: status.code(),
        })
    }
}

/// Logs commands instead of running them
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &Command) -> Result<CommandOutcome, SpawnError> {
        info!("[dry-run] {}", command);
        Ok(CommandOutcome::success())
    }
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    async fn run(&self, command: &Command) -> Result<CommandOutcome, SpawnError> {
        (**self).run(command).await
    }
}
