//! The job/result data model: everything that crosses a component boundary
//! as a plain value.

use serde::{Deserialize, Serialize};

use crate::id::JobId;

/// Static per-language configuration. The registry is data, not code; the
/// agent never mutates it at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProfile {
    pub image: String,
    pub file_extension: String,
    pub solution_filename: String,
    pub test_filename: String,
    #[serde(default)]
    pub compile_argv: Option<Vec<String>>,
    pub run_argv: Vec<String>,
    /// Final argv element appended to `run_argv` when building the run
    /// container: the test-file name for interpreted languages, or the
    /// compiled artifact name (e.g. a class or binary name) otherwise.
    pub run_target: String,
    pub memory_limit_mi_b: u64,
    pub cpu_limit_cores: f64,
    pub timeout_millis: u64,
}

/// A single evaluation request as received from the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub language: String,
    pub code: String,
    /// Opaque test-case payload. Never interpreted by the agent, only
    /// forwarded into the harness template verbatim.
    pub test_cases: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, alias = "stack")]
    pub trace: Option<String>,
}

/// One test case's outcome, as emitted by the harness inside `Summary.cases`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: u32,
    pub status: CaseStatus,
    pub input: serde_json::Value,
    pub expected: serde_json::Value,
    #[serde(default)]
    pub actual: Option<serde_json::Value>,
    pub time: u64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<CaseError>,
}

/// The harness's authoritative final report for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub execution_time: u64,
    pub cases: Vec<CaseResult>,
}

/// What `JobExecutor::execute` returns on a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub execution_time: u64,
    pub cases: Vec<CaseResult>,
}

impl From<Summary> for JobOutcome {
    fn from(summary: Summary) -> Self {
        Self {
            success: summary.failed == 0,
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            execution_time: summary.execution_time,
            cases: summary.cases,
        }
    }
}

/// A decoded line from the harness's stdout stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultEvent {
    TestResult { data: CaseResult },
    FinalResult { data: Summary },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_outcome_success_matches_failed_count() {
        let summary = Summary {
            total: 2,
            passed: 1,
            failed: 1,
            execution_time: 12,
            cases: vec![],
        };
        let outcome: JobOutcome = summary.into();
        assert!(!outcome.success);
    }

    #[test]
    fn result_event_decodes_test_result_and_final_result() {
        let line = r#"{"type":"final_result","data":{"total":1,"passed":1,"failed":0,"execution_time":5,"cases":[]}}"#;
        let event: ResultEvent = serde_json::from_str(line).unwrap();
        matches!(event, ResultEvent::FinalResult { .. });
    }
}
