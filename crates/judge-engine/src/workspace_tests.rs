use super::*;
use judge_core::id::JobId;
use serde_json::json;

fn profile() -> LanguageProfile {
    LanguageProfile {
        image: "python:3.12-slim".to_string(),
        file_extension: "py".to_string(),
        solution_filename: "solution.py".to_string(),
        test_filename: "test.py".to_string(),
        compile_argv: None,
        run_argv: vec!["python3".to_string()],
        run_target: "test.py".to_string(),
        memory_limit_mi_b: 256,
        cpu_limit_cores: 1.0,
        timeout_millis: 5_000,
    }
}

fn job() -> Job {
    Job {
        id: JobId::from("job-1"),
        language: "python".to_string(),
        code: "print('hi')".to_string(),
        test_cases: json!([]),
    }
}

#[test]
fn create_writes_solution_and_test_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(tmp.path());
    let guard = manager
        .create(&job(), &profile(), "rendered test content")
        .expect("create workspace");

    let solution = std::fs::read_to_string(guard.path().join("solution.py")).expect("read solution");
    assert_eq!(solution, "print('hi')");

    let test_file = std::fs::read_to_string(guard.path().join("test.py")).expect("read test file");
    assert_eq!(test_file, "rendered test content");
}

#[test]
fn destroy_removes_the_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(tmp.path());
    let guard = manager
        .create(&job(), &profile(), "content")
        .expect("create workspace");
    let path = guard.path().to_path_buf();
    guard.destroy();
    assert!(!path.exists());
}

#[test]
fn drop_without_destroy_still_cleans_up() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(tmp.path());
    let path = {
        let guard = manager.create(&job(), &profile(), "content").expect("create");
        guard.path().to_path_buf()
    };
    assert!(!path.exists());
}

#[test]
fn sweep_stale_removes_old_directories_only() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(tmp.path());
    let guard = manager.create(&job(), &profile(), "content").expect("create");
    let path = guard.path().to_path_buf();
    std::mem::forget(guard);

    manager.sweep_stale(std::time::Duration::from_secs(3_600));
    assert!(path.exists(), "fresh directory should survive a long grace period");
}
