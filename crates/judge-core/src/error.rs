//! The error taxonomy a job can fail with, matching the kinds and trigger
//! conditions in the job-execution contract.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Workspace error: {0}")]
    WorkspaceError(String),

    #[error("Compilation failed: {log_tail}")]
    CompileError { log_tail: String },

    #[error("Execution timeout")]
    ExecutionTimeout,

    #[error("Container exited with code {exit_code}")]
    ContainerExit { exit_code: i64 },

    #[error("No test results received")]
    NoResult,

    #[error("Sandbox error: {0}")]
    SandboxError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        unsupported_language = { ExecutionError::UnsupportedLanguage("ruby".to_string()), "Unsupported language: ruby" },
        workspace_error = { ExecutionError::WorkspaceError("disk full".to_string()), "Workspace error: disk full" },
        compile_error = { ExecutionError::CompileError { log_tail: "syntax error".to_string() }, "Compilation failed: syntax error" },
        execution_timeout = { ExecutionError::ExecutionTimeout, "Execution timeout" },
        container_exit = { ExecutionError::ContainerExit { exit_code: 137 }, "Container exited with code 137" },
        no_result = { ExecutionError::NoResult, "No test results received" },
        sandbox_error = { ExecutionError::SandboxError("daemon unreachable".to_string()), "Sandbox error: daemon unreachable" },
    )]
    fn display_message_matches(error: ExecutionError, expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
