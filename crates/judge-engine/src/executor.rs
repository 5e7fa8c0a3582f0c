//! Composes the workspace, sandbox, and parser into the end-to-end run of
//! one job: optional compile step, run step, a timeout race against the
//! container's exit, and guaranteed cleanup on every path.

use std::sync::Arc;
use std::time::Duration;

use judge_core::error::ExecutionError;
use judge_core::model::{Job, JobOutcome};
use judge_sandbox::{ContainerHandle, ContainerSpec, SandboxDriver};
use tracing::{info, info_span, warn, Instrument};

use crate::harness::{render, template_for};
use crate::parser::ResultParser;
use crate::registry::Registry;
use crate::workspace::WorkspaceManager;

/// Tail of compile-container logs kept for `CompileError` reporting.
const LOG_TAIL_CAP: usize = 64 * 1024;

pub struct JobExecutor {
    registry: Arc<Registry>,
    sandbox: Arc<dyn SandboxDriver>,
    workspace: Arc<WorkspaceManager>,
}

impl JobExecutor {
    pub fn new(
        registry: Arc<Registry>,
        sandbox: Arc<dyn SandboxDriver>,
        workspace: Arc<WorkspaceManager>,
    ) -> Self {
        Self {
            registry,
            sandbox,
            workspace,
        }
    }

    pub async fn execute(&self, job: Job) -> Result<JobOutcome, ExecutionError> {
        let span = info_span!("execute_job", job_id = %job.id, language = %job.language);
        self.execute_inner(job).instrument(span).await
    }

    async fn execute_inner(&self, job: Job) -> Result<JobOutcome, ExecutionError> {
        let profile = self
            .registry
            .get(&job.language)
            .cloned()
            .ok_or_else(|| ExecutionError::UnsupportedLanguage(job.language.clone()))?;

        let template = template_for(&job.language).unwrap_or_default();
        let rendered = render(template, &job.test_cases);

        let workspace = self
            .workspace
            .create(&job, &profile, &rendered)
            .map_err(|err| ExecutionError::WorkspaceError(err.to_string()))?;

        let result = self.run_in_workspace(&profile, workspace.path()).await;
        workspace.destroy();
        result
    }

    async fn run_in_workspace(
        &self,
        profile: &judge_core::model::LanguageProfile,
        workspace_path: &std::path::Path,
    ) -> Result<JobOutcome, ExecutionError> {
        if let Some(compile_argv) = &profile.compile_argv {
            self.compile(profile, workspace_path, compile_argv).await?;
        }

        let mut argv = profile.run_argv.clone();
        argv.push(profile.run_target.clone());

        let run_spec = ContainerSpec {
            image: profile.image.clone(),
            argv,
            workdir: "/code".to_string(),
            host_mount_path: workspace_path.to_string_lossy().into_owned(),
            mount_target: "/code".to_string(),
            memory_limit_mib: profile.memory_limit_mi_b,
            cpu_limit_cores: profile.cpu_limit_cores,
        };

        let handle = self
            .sandbox
            .build_run_container(run_spec)
            .await
            .map_err(|err| ExecutionError::SandboxError(err.to_string()))?;

        let outcome = self.run_and_race_timeout(&handle, profile.timeout_millis).await;
        self.sandbox.dispose(&handle).await;
        outcome
    }

    async fn compile(
        &self,
        profile: &judge_core::model::LanguageProfile,
        workspace_path: &std::path::Path,
        compile_argv: &[String],
    ) -> Result<(), ExecutionError> {
        let spec = ContainerSpec {
            image: profile.image.clone(),
            argv: compile_argv.to_vec(),
            workdir: "/code".to_string(),
            host_mount_path: workspace_path.to_string_lossy().into_owned(),
            mount_target: "/code".to_string(),
            memory_limit_mib: profile.memory_limit_mi_b,
            cpu_limit_cores: profile.cpu_limit_cores,
        };

        let handle = self
            .sandbox
            .build_compile_container(spec)
            .await
            .map_err(|err| ExecutionError::SandboxError(err.to_string()))?;

        let mut run = self
            .sandbox
            .run(&handle)
            .await
            .map_err(|err| ExecutionError::SandboxError(err.to_string()))?;

        let mut log_tail = Vec::new();
        while let Some(chunk) = run.logs.recv().await {
            log_tail.extend_from_slice(&chunk);
            if log_tail.len() > LOG_TAIL_CAP {
                let overflow = log_tail.len() - LOG_TAIL_CAP;
                log_tail.drain(0..overflow);
            }
        }

        let exit_code = match run.exit.await {
            Ok(Ok(code)) => code,
            Ok(Err(err)) => {
                self.sandbox.dispose(&handle).await;
                return Err(ExecutionError::SandboxError(err.to_string()));
            }
            Err(_) => {
                self.sandbox.dispose(&handle).await;
                return Err(ExecutionError::SandboxError(
                    "compile container exit channel closed".to_string(),
                ));
            }
        };

        self.sandbox.dispose(&handle).await;

        if exit_code != 0 {
            return Err(ExecutionError::CompileError {
                log_tail: String::from_utf8_lossy(&log_tail).into_owned(),
            });
        }
        Ok(())
    }

    /// Races the job's timeout against the container's exit. Whichever
    /// fires first wins; the loser is a no-op. The caller disposes the
    /// container regardless of which branch returns.
    async fn run_and_race_timeout(
        &self,
        handle: &ContainerHandle,
        timeout_millis: u64,
    ) -> Result<JobOutcome, ExecutionError> {
        let mut run = self
            .sandbox
            .run(handle)
            .await
            .map_err(|err| ExecutionError::SandboxError(err.to_string()))?;

        let mut parser = ResultParser::new();
        let timeout = tokio::time::sleep(Duration::from_millis(timeout_millis));
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                biased;

                _ = &mut timeout => {
                    warn!("job exceeded configured timeout");
                    return Err(ExecutionError::ExecutionTimeout);
                }

                exit = &mut run.exit => {
                    // Drain any remaining buffered log chunks before
                    // deciding the outcome.
                    while let Ok(chunk) = run.logs.try_recv() {
                        parser.feed(&chunk);
                    }
                    return self.finish(exit, parser);
                }

                chunk = run.logs.recv() => {
                    match chunk {
                        Some(chunk) => parser.feed(&chunk),
                        None => continue,
                    }
                }
            }
        }
    }

    fn finish(
        &self,
        exit: Result<Result<i64, judge_sandbox::SandboxError>, tokio::sync::oneshot::error::RecvError>,
        parser: ResultParser,
    ) -> Result<JobOutcome, ExecutionError> {
        let exit_code = match exit {
            Ok(Ok(code)) => code,
            Ok(Err(err)) => return Err(ExecutionError::SandboxError(err.to_string())),
            Err(_) => {
                return Err(ExecutionError::SandboxError(
                    "run container exit channel closed".to_string(),
                ))
            }
        };

        if exit_code != 0 {
            return Err(ExecutionError::ContainerExit { exit_code });
        }

        match parser.into_final_result() {
            Some(summary) => {
                info!(total = summary.total, passed = summary.passed, "job finished");
                Ok(summary.into())
            }
            None => Err(ExecutionError::NoResult),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
