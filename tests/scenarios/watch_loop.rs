//! Scenario: the watch loop serializes and coalesces triggered runs

use crate::helpers::*;
use async_trait::async_trait;
use relay::core::Pipeline;
use relay::execution::ExecutionEngine;
use relay::watch::{observer, PipelineTrigger, TriggerHandler, WatchRule, WatchTrigger};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

const ROOT: &str = "/work/ajax";

fn rule() -> WatchRule {
    WatchRule::new(["src/**/*", "test/**/*"])
}

fn batch(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(|p| Path::new(ROOT).join(p)).collect()
}

/// Handler that reports each start and then waits for a permit
struct GatedHandler {
    started: mpsc::UnboundedSender<usize>,
    gate: Arc<Semaphore>,
    runs: AtomicUsize,
    fail: bool,
}

impl GatedHandler {
    fn new(gate: Arc<Semaphore>, fail: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        let (started, rx) = mpsc::unbounded_channel();
        let handler = Arc::new(Self {
            started,
            gate,
            runs: AtomicUsize::new(0),
            fail,
        });
        (handler, rx)
    }
}

#[async_trait]
impl TriggerHandler for GatedHandler {
    async fn on_trigger(&self) -> anyhow::Result<()> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.started.send(run);
        self.gate.acquire().await?.forget();
        if self.fail {
            anyhow::bail!("run {} failed", run);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_each_settled_change_triggers_one_run() {
    let gate = Arc::new(Semaphore::new(0));
    let (handler, mut started) = GatedHandler::new(gate.clone(), false);
    let (changes, rx) = mpsc::channel(16);
    let trigger = WatchTrigger::new(ROOT, rule());
    let task = tokio::spawn(async move { trigger.run(rx, handler).await });

    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    assert_eq!(started.recv().await, Some(1));
    gate.add_permits(1);

    changes.send(batch(&["test/ajax.test.js"])).await.unwrap();
    assert_eq!(started.recv().await, Some(2));
    gate.add_permits(1);

    drop(changes);
    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.runs, 2);
    assert_eq!(summary.failures, 0);
}

#[tokio::test]
async fn test_changes_during_a_run_queue_exactly_one_more() {
    let gate = Arc::new(Semaphore::new(0));
    let (handler, mut started) = GatedHandler::new(gate.clone(), false);
    let (changes, rx) = mpsc::channel(16);
    let trigger = WatchTrigger::new(ROOT, rule());
    let task = tokio::spawn(async move { trigger.run(rx, handler).await });

    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    assert_eq!(started.recv().await, Some(1));

    // Three more saves while the first run is still going
    for file in ["src/a.js", "src/b.js", "test/c.js"] {
        changes.send(batch(&[file])).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    gate.add_permits(2);
    drop(changes);
    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.runs, 2);
}

#[tokio::test]
async fn test_initial_run_happens_without_changes() {
    let gate = Arc::new(Semaphore::new(1));
    let (handler, _started) = GatedHandler::new(gate, false);
    let (changes, rx) = mpsc::channel::<Vec<PathBuf>>(16);
    drop(changes);

    let summary = WatchTrigger::new(ROOT, rule())
        .with_initial_run()
        .run(rx, handler)
        .await
        .unwrap();

    assert_eq!(summary.runs, 1);
}

#[tokio::test]
async fn test_change_during_initial_run_is_not_lost() {
    let gate = Arc::new(Semaphore::new(0));
    let (handler, mut started) = GatedHandler::new(gate.clone(), false);
    let (changes, rx) = mpsc::channel(16);
    let trigger = WatchTrigger::new(ROOT, rule()).with_initial_run();
    let task = tokio::spawn(async move { trigger.run(rx, handler).await });

    assert_eq!(started.recv().await, Some(1));
    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    gate.add_permits(2);
    drop(changes);
    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.runs, 2);
}

#[tokio::test]
async fn test_unrelated_changes_are_ignored() {
    let gate = Arc::new(Semaphore::new(10));
    let (handler, _started) = GatedHandler::new(gate, false);
    let (changes, rx) = mpsc::channel(16);
    let trigger = WatchTrigger::new(ROOT, rule());

    changes.send(batch(&["README.md"])).await.unwrap();
    changes.send(batch(&["dist/ajax.min.js", "package.json"])).await.unwrap();
    drop(changes);

    let summary = trigger.run(rx, handler).await.unwrap();
    assert_eq!(summary.runs, 0);
}

#[tokio::test]
async fn test_failed_run_keeps_watching() {
    let gate = Arc::new(Semaphore::new(0));
    let (handler, mut started) = GatedHandler::new(gate.clone(), true);
    let (changes, rx) = mpsc::channel(16);
    let trigger = WatchTrigger::new(ROOT, rule());
    let task = tokio::spawn(async move { trigger.run(rx, handler).await });

    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    assert_eq!(started.recv().await, Some(1));
    gate.add_permits(1);

    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    assert_eq!(started.recv().await, Some(2));
    gate.add_permits(1);

    drop(changes);
    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.runs, 2);
    assert_eq!(summary.failures, 2);
}

#[tokio::test]
async fn test_pipeline_trigger_runs_test_then_lint() {
    let engine = Arc::new(ExecutionEngine::new(
        MockRunner::new().exits("npm test", 1),
    ));
    let pipeline = Pipeline::new("watch")
        .stage(stage("test", &["npm test"]))
        .stage(stage("lint", &["npm run lint"]));
    let handler = Arc::new(PipelineTrigger::new(engine.clone(), pipeline));

    let (changes, rx) = mpsc::channel(16);
    changes.send(batch(&["src/ajax.js"])).await.unwrap();
    drop(changes);

    let summary = WatchTrigger::new(ROOT, rule()).run(rx, handler).await.unwrap();

    assert_eq!(summary.runs, 1);
    assert_eq!(summary.failures, 1);
    // Failing tests stop the run before lint
    assert_eq!(engine.executor().runner().calls(), ["npm test"]);
}

#[tokio::test]
async fn test_native_observer_reports_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = std::fs::canonicalize(dir.path()).unwrap();
    std::fs::create_dir(root.join("src")).unwrap();

    let (_watcher, mut rx) = observer::spawn(&root, rule()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(root.join("notes.txt"), "ignored").unwrap();
    std::fs::write(root.join("src/ajax.js"), "export default 1").unwrap();

    let paths = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no change reported")
        .unwrap();
    assert!(paths.iter().all(|p| p.ends_with("src/ajax.js")));
}
