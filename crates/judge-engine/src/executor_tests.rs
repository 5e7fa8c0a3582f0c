use super::*;
use judge_core::id::JobId;
use judge_sandbox::{FakeSandboxDriver, ScriptedRun};
use serde_json::json;

fn job(language: &str) -> Job {
    Job {
        id: JobId::from("job-1"),
        language: language.to_string(),
        code: "ignored by the fake sandbox".to_string(),
        test_cases: json!([{"input": [1, 2], "expected": 3}]),
    }
}

fn final_result_line(passed: u32, failed: u32) -> Vec<u8> {
    let total = passed + failed;
    format!(
        r#"{{"type":"final_result","data":{{"total":{total},"passed":{passed},"failed":{failed},"execution_time":5,"cases":[]}}}}
"#
    )
    .into_bytes()
}

fn executor_with(runs: Vec<ScriptedRun>) -> JobExecutor {
    let tmp = tempfile::tempdir().expect("tempdir");
    // Leak the tempdir so the workspace root outlives the test body; the
    // executor's own cleanup still removes each per-job subdirectory.
    let root = tmp.into_path();
    JobExecutor::new(
        Arc::new(Registry::default()),
        Arc::new(FakeSandboxDriver::new(runs)),
        Arc::new(WorkspaceManager::new(root)),
    )
}

#[tokio::test]
async fn happy_path_reports_success() {
    let executor = executor_with(vec![ScriptedRun::immediate(0, vec![final_result_line(1, 0)])]);
    let outcome = executor.execute(job("python")).await.expect("outcome");
    assert!(outcome.success);
    assert_eq!(outcome.passed, 1);
    assert_eq!(outcome.failed, 0);
}

#[tokio::test]
async fn wrong_answer_reports_failure_without_erroring() {
    let executor = executor_with(vec![ScriptedRun::immediate(0, vec![final_result_line(1, 1)])]);
    let outcome = executor.execute(job("python")).await.expect("outcome");
    assert!(!outcome.success);
    assert_eq!(outcome.passed, 1);
    assert_eq!(outcome.failed, 1);
}

#[tokio::test]
async fn unknown_language_fails_before_any_container_is_built() {
    let executor = executor_with(vec![]);
    let err = executor.execute(job("ruby")).await.unwrap_err();
    match err {
        ExecutionError::UnsupportedLanguage(lang) => assert_eq!(lang, "ruby"),
        other => panic!("expected UnsupportedLanguage, got {other}"),
    }
}

#[tokio::test]
async fn compile_failure_short_circuits_before_run_container() {
    let executor = executor_with(vec![ScriptedRun::immediate(1, vec![b"error: expected ';'".to_vec()])]);
    let err = executor.execute(job("java")).await.unwrap_err();
    match err {
        ExecutionError::CompileError { log_tail } => {
            assert!(log_tail.contains("expected"));
        }
        other => panic!("expected CompileError, got {other}"),
    }
}

#[tokio::test]
async fn nonzero_exit_without_compile_step_is_container_exit() {
    let executor = executor_with(vec![ScriptedRun::immediate(1, vec![])]);
    let err = executor.execute(job("python")).await.unwrap_err();
    match err {
        ExecutionError::ContainerExit { exit_code } => assert_eq!(exit_code, 1),
        other => panic!("expected ContainerExit, got {other}"),
    }
}

#[tokio::test]
async fn clean_exit_with_no_final_result_is_no_result() {
    let executor = executor_with(vec![ScriptedRun::immediate(0, vec![b"no json here\n".to_vec()])]);
    let err = executor.execute(job("python")).await.unwrap_err();
    assert!(matches!(err, ExecutionError::NoResult));
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_deterministically_and_disposes_container() {
    let executor = executor_with(vec![ScriptedRun::hangs_forever()]);
    let execution = tokio::spawn(async move { executor.execute(job("python")).await });

    tokio::time::advance(Duration::from_millis(5_001)).await;
    let result = execution.await.expect("task join");
    assert!(matches!(result, Err(ExecutionError::ExecutionTimeout)));
}
