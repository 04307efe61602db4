use super::*;
use vh_core::ExecutionMode;

fn ctx() -> RunnerContext {
    RunnerContext {
        vault_root: "/vault".to_string(),
        runner_command: None,
        timeout: Duration::from_secs(5),
    }
}

fn task_ctx(id: &str) -> TaskContext {
    TaskContext {
        task_id: id.to_string(),
        target: "n".to_string(),
        source_path: "archive/x.md".to_string(),
        phase: Phase::Surface,
        execution_mode: ExecutionMode::Orchestrated,
        prompt: "do the thing".to_string(),
    }
}

#[tokio::test]
async fn noop_runner_reports_success_without_executing() {
    let runner = NoOpTaskRunner::new();
    let outcome = runner.run(task_ctx("t1"), ctx()).await.unwrap();
    assert!(outcome.success);
    assert!(!outcome.executed);
}

#[tokio::test]
async fn fake_runner_replays_scripted_outcomes_in_order() {
    let fake = FakeTaskRunner::new();
    fake.push_success("t1", Phase::Surface);
    fake.push_failure("t1", Phase::Surface, "boom");

    let first = fake.run(task_ctx("t1"), ctx()).await.unwrap();
    assert!(first.success);

    let second = fake.run(task_ctx("t1"), ctx()).await.unwrap();
    assert!(!second.success);
    assert_eq!(second.detail, "boom");

    assert_eq!(fake.calls().len(), 2);
}

#[tokio::test]
async fn fake_runner_defaults_to_success_when_queue_empty() {
    let fake = FakeTaskRunner::new();
    let outcome = fake.run(task_ctx("t1"), ctx()).await.unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn fake_runner_replays_scripted_error() {
    let fake = FakeTaskRunner::new();
    fake.push_error(RunnerError::Timeout {
        task_id: "t1".to_string(),
        detail: "exceeded".to_string(),
    });

    let result = fake.run(task_ctx("t1"), ctx()).await;
    assert!(result.is_err());
}
