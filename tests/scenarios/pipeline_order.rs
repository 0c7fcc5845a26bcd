//! Scenario: stages run strictly in declared order

use crate::helpers::*;
use relay::core::{Pipeline, StageState};

#[tokio::test]
async fn test_all_stages_run_in_order() {
    let pipeline = Pipeline::new("p")
        .stage(stage("one", &["echo 1", "echo 1b"]))
        .stage(stage("two", &["echo 2"]))
        .stage(stage("three", &["echo 3"]));

    let (run, calls) = run_pipeline_with_mock(&pipeline, MockRunner::new()).await;

    assert_pipeline_completed(&run);
    assert_execution_order(&run, &["one", "two", "three"]);
    assert_eq!(calls, ["echo 1", "echo 1b", "echo 2", "echo 3"]);
    assert!(run.completed_at.is_some());
}

#[tokio::test]
async fn test_stages_after_failure_are_skipped() {
    let pipeline = Pipeline::new("p")
        .stage(stage("ok-1", &["echo 1"]))
        .stage(stage("fail", &["false"]))
        .stage(stage("ok-2", &["echo 2"]));
    let runner = MockRunner::new().exits("false", 1);

    let (run, calls) = run_pipeline_with_mock(&pipeline, runner).await;

    assert_pipeline_failed(&run);
    assert_execution_order(&run, &["ok-1", "fail"]);
    assert!(matches!(
        run.stage_state("ok-1"),
        Some(StageState::Completed { .. })
    ));
    assert_eq!(run.stage_state("ok-2"), Some(&StageState::Skipped));
    assert!(!calls.contains(&"echo 2".to_string()));
}

#[tokio::test]
async fn test_empty_stage_succeeds_without_commands() {
    let pipeline = Pipeline::new("p")
        .stage(stage("nothing", &[]))
        .stage(stage("after", &["echo after"]));

    let (run, calls) = run_pipeline_with_mock(&pipeline, MockRunner::new()).await;

    assert_pipeline_completed(&run);
    assert_execution_order(&run, &["nothing", "after"]);
    assert_eq!(calls, ["echo after"]);
}

#[tokio::test]
async fn test_pipeline_can_be_rerun() {
    let pipeline = Pipeline::new("watch").stage(stage("test", &["npm test"]));
    let engine = relay::execution::ExecutionEngine::new(MockRunner::new());

    let first = engine.execute(&pipeline).await;
    let second = engine.execute(&pipeline).await;

    assert_pipeline_completed(&first);
    assert_pipeline_completed(&second);
    assert_ne!(first.execution_id, second.execution_id);
    assert_eq!(engine.executor().runner().calls(), ["npm test", "npm test"]);
}
