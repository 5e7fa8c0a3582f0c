//! An in-memory `SandboxDriver` for tests: no Docker daemon required. Each
//! call to `build_compile_container`/`build_run_container` consumes the
//! next scripted run in FIFO order, mirroring how a real compile-then-run
//! job creates two containers in sequence.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::driver::{ContainerHandle, ContainerSpec, RunHandle, SandboxDriver};
use crate::error::SandboxError;

/// One scripted container lifecycle: the log chunks it emits, its final
/// exit code, and an optional artificial delay before exit (used to drive
/// the timeout race deterministically under `tokio::time::pause`).
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub log_chunks: Vec<Vec<u8>>,
    pub exit_code: i64,
    pub delay: Duration,
}

impl ScriptedRun {
    pub fn immediate(exit_code: i64, log_chunks: Vec<Vec<u8>>) -> Self {
        Self {
            log_chunks,
            exit_code,
            delay: Duration::ZERO,
        }
    }

    pub fn hangs_forever() -> Self {
        Self {
            log_chunks: vec![],
            exit_code: 0,
            delay: Duration::from_secs(3_600),
        }
    }
}

pub struct FakeSandboxDriver {
    queue: Mutex<VecDeque<ScriptedRun>>,
    created: Mutex<Vec<ContainerSpec>>,
}

impl FakeSandboxDriver {
    pub fn new(runs: Vec<ScriptedRun>) -> Self {
        Self {
            queue: Mutex::new(runs.into_iter().collect()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Specs passed to `build_*_container`, in call order — lets tests
    /// assert the argv/image the executor assembled.
    pub fn created_specs(&self) -> Vec<ContainerSpec> {
        self.created.lock().clone()
    }

    async fn create(&self, spec: ContainerSpec) -> Result<ContainerHandle, SandboxError> {
        self.created.lock().push(spec);
        Ok(ContainerHandle(format!(
            "fake-{}",
            self.created.lock().len()
        )))
    }
}

#[async_trait]
impl SandboxDriver for FakeSandboxDriver {
    async fn build_compile_container(
        &self,
        spec: ContainerSpec,
    ) -> Result<ContainerHandle, SandboxError> {
        self.create(spec).await
    }

    async fn build_run_container(
        &self,
        spec: ContainerSpec,
    ) -> Result<ContainerHandle, SandboxError> {
        self.create(spec).await
    }

    async fn run(&self, _handle: &ContainerHandle) -> Result<RunHandle, SandboxError> {
        let scripted = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| ScriptedRun::immediate(0, vec![]));

        let (log_tx, log_rx) = mpsc::channel(64);
        let (exit_tx, exit_rx) = oneshot::channel();

        tokio::spawn(async move {
            for chunk in scripted.log_chunks {
                if log_tx.send(chunk).await.is_err() {
                    return;
                }
            }
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            let _ = exit_tx.send(Ok(scripted.exit_code));
        });

        Ok(RunHandle {
            logs: log_rx,
            exit: exit_rx,
        })
    }

    async fn dispose(&self, _handle: &ContainerHandle) {}

    async fn live_containers(&self) -> Vec<ContainerHandle> {
        vec![]
    }

    async fn container_usage(&self, _handle: &ContainerHandle) -> Result<(f64, u64), SandboxError> {
        Ok((0.0, 0))
    }
}
