//! Development watch loop
//!
//! File changes matching the watch patterns re-run a small fixed pipeline.
//! A failed run is reported and absorbed; the loop keeps observing until
//! the process is terminated or the change stream ends.

pub mod observer;

use crate::{
    core::{config::WatchConfig, Pipeline},
    execution::{CommandRunner, ExecutionEngine},
};
use anyhow::Result;
use async_trait::async_trait;
use glob_match::glob_match;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

/// Glob patterns selecting the files whose changes trigger a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub patterns: Vec<String>,
}

impl WatchRule {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.patterns.iter().cloned())
    }

    /// Check a `/`-separated path, relative to the project root
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns.iter().any(|pattern| glob_match(pattern, relative))
    }

    /// Check a path reported by the watcher backend against the patterns
    pub fn matches_path(&self, root: &Path, path: &Path) -> bool {
        self.matches(&relative_path(root, path))
    }
}

/// Path relative to `root` with `/` separators; unrelated paths are kept whole
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Callback run for each (coalesced) batch of matching changes
#[async_trait]
pub trait TriggerHandler: Send + Sync + 'static {
    async fn on_trigger(&self) -> Result<()>;
}

/// Re-runs a pipeline through the orchestrator on every trigger
pub struct PipelineTrigger<R> {
    engine: Arc<ExecutionEngine<R>>,
    pipeline: Pipeline,
}

impl<R> PipelineTrigger<R> {
    pub fn new(engine: Arc<ExecutionEngine<R>>, pipeline: Pipeline) -> Self {
        Self { engine, pipeline }
    }
}

#[async_trait]
impl<R: CommandRunner + 'static> TriggerHandler for PipelineTrigger<R> {
    async fn on_trigger(&self) -> Result<()> {
        self.engine.execute(&self.pipeline).await.into_result()?;
        Ok(())
    }
}

/// Counters for a finished watch session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Triggered runs, after coalescing
    pub runs: usize,
    /// Runs whose handler reported an error
    pub failures: usize,
}

/// Observes file changes and re-runs the handler for matching ones
pub struct WatchTrigger {
    root: PathBuf,
    rule: WatchRule,
    initial_run: bool,
}

impl WatchTrigger {
    pub fn new(root: impl Into<PathBuf>, rule: WatchRule) -> Self {
        Self {
            root: root.into(),
            rule,
            initial_run: false,
        }
    }

    /// Queue one run before any change arrives
    ///
    /// The run goes through the same queue as change-triggered runs, so a
    /// change saved while it executes queues a follow-up.
    pub fn with_initial_run(mut self) -> Self {
        self.initial_run = true;
        self
    }

    pub fn rule(&self) -> &WatchRule {
        &self.rule
    }

    /// Watch the project root with the native backend until the process ends
    pub async fn watch<H: TriggerHandler>(&self, handler: Arc<H>) -> Result<WatchSummary> {
        let root = std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());
        let (_watcher, changes) = observer::spawn(&root, self.rule.clone())?;
        info!(
            "Watching {} for changes to {}",
            root.display(),
            self.rule.patterns.join(", ")
        );

        let trigger = WatchTrigger {
            root,
            rule: self.rule.clone(),
            initial_run: self.initial_run,
        };
        trigger.run(changes, handler).await
    }

    /// Consume batches of changed paths and drive the handler
    ///
    /// Runs are serialized through a single-slot queue: a change arriving
    /// while a run executes queues exactly one follow-up run, and further
    /// changes before that run starts are folded into it. Returns once the
    /// change stream closes and the last queued run has finished.
    pub async fn run<H: TriggerHandler>(
        &self,
        mut changes: mpsc::Receiver<Vec<PathBuf>>,
        handler: Arc<H>,
    ) -> Result<WatchSummary> {
        let (queue, mut pending) = mpsc::channel::<()>(1);

        let worker = tokio::spawn(async move {
            let mut summary = WatchSummary::default();
            while pending.recv().await.is_some() {
                summary.runs += 1;
                if let Err(e) = handler.on_trigger().await {
                    summary.failures += 1;
                    warn!("Triggered run failed, still watching: {:#}", e);
                }
            }
            summary
        });

        if self.initial_run {
            debug!("Queueing initial run");
            if queue.try_send(()).is_err() {
                error!("Watch worker stopped before the initial run");
            }
        }

        while let Some(batch) = changes.recv().await {
            let matched: Vec<String> = batch
                .iter()
                .filter(|path| self.rule.matches_path(&self.root, path))
                .map(|path| relative_path(&self.root, path))
                .collect();
            if matched.is_empty() {
                continue;
            }

            info!("Changed: {}", matched.join(", "));
            match queue.try_send(()) {
                Ok(()) => {}
                Err(TrySendError::Full(())) => {
                    debug!("A run is already queued; folding change into it");
                }
                Err(TrySendError::Closed(())) => {
                    error!("Watch worker stopped unexpectedly");
                    break;
                }
            }
        }

        drop(queue);
        let summary = worker.await?;
        info!(
            "Watch finished: {} run(s), {} failed",
            summary.runs, summary.failures
        );
        Ok(summary)
    }
}
