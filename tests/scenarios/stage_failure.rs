//! Scenario: a failing command stops its stage and the pipeline

use crate::helpers::*;
use relay::core::{Command, Pipeline, Stage, StageState};
use relay::execution::CommandError;

#[tokio::test]
async fn test_and_then_chain_stops_at_first_failure() {
    let pipeline = Pipeline::new("chain").stage(stage("s", &["echo a", "false", "echo b"]));
    let runner = MockRunner::new().exits("false", 1);

    let (run, calls) = run_pipeline_with_mock(&pipeline, runner).await;

    assert_pipeline_failed(&run);
    assert_stage_failed(&run, "s", 1);
    assert_eq!(calls, ["echo a", "false"]);
}

#[tokio::test]
async fn test_failure_chain_names_command_stage_and_pipeline() {
    let pipeline = Pipeline::new("release")
        .stage(stage("sync-repository", &["git pull origin dev --force"]))
        .stage(stage("publish-package", &["npm publish"]));
    let runner = MockRunner::new().exits("npm publish", 1);

    let (run, _) = run_pipeline_with_mock(&pipeline, runner).await;
    let failure = run.into_result().unwrap_err();

    assert_eq!(failure.stage_name(), "publish-package");
    assert_eq!(failure.position, 2);
    assert_eq!(failure.total, 2);
    match &failure.failure.cause {
        CommandError::Failed(f) => {
            assert_eq!(f.command, "npm publish");
            assert_eq!(f.code, Some(1));
        }
        other => panic!("Expected a non-zero exit, got {:?}", other),
    }

    let message = failure.to_string();
    assert!(message.contains("release"));
    assert!(message.contains("publish-package"));
    assert!(message.contains("npm publish"));
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
    let pipeline = Pipeline::new("p")
        .stage(stage("lint", &["eslint src"]))
        .stage(stage("test", &["npm test"]));
    let runner = MockRunner::new().missing("eslint src");

    let (run, calls) = run_pipeline_with_mock(&pipeline, runner).await;

    assert_pipeline_failed(&run);
    assert_stage_failed(&run, "lint", 0);
    assert_eq!(run.stage_state("test"), Some(&StageState::Skipped));
    assert_eq!(calls, ["eslint src"]);

    let failure = run.into_result().unwrap_err();
    assert!(matches!(failure.failure.cause, CommandError::Spawn(_)));
}

#[tokio::test]
async fn test_allowed_failure_does_not_stop_stage() {
    let pipeline = Pipeline::new("p").stage(
        Stage::new("cleanup")
            .command(Command::parse("rm -rf .tmp").unwrap().allow_failure(true))
            .command(Command::parse("mkdir .tmp").unwrap()),
    );
    let runner = MockRunner::new().exits("rm -rf .tmp", 1);

    let (run, calls) = run_pipeline_with_mock(&pipeline, runner).await;

    assert_pipeline_completed(&run);
    assert_eq!(calls, ["rm -rf .tmp", "mkdir .tmp"]);
}

#[tokio::test]
async fn test_allowed_failure_never_covers_spawn_errors() {
    let pipeline = Pipeline::new("p").stage(
        Stage::new("s")
            .command(Command::parse("optional-tool").unwrap().allow_failure(true))
            .command(Command::parse("echo after").unwrap()),
    );
    let runner = MockRunner::new().missing("optional-tool");

    let (run, calls) = run_pipeline_with_mock(&pipeline, runner).await;

    assert_pipeline_failed(&run);
    assert_eq!(calls, ["optional-tool"]);
}
