//! The container driver seam. `SandboxDriver` is implemented once against
//! the real Docker Engine API (`docker.rs`) and once in-memory for tests
//! (`fake.rs`); `JobExecutor` only ever talks to the trait object.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::SandboxError;

/// An opaque handle to a created-but-not-necessarily-running container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(pub String);

impl ContainerHandle {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Everything needed to create one container. The hardening defaults
/// (network disabled, non-privileged, no-new-privileges, auto-remove) are
/// applied by the driver implementation, not carried here.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    pub argv: Vec<String>,
    pub workdir: String,
    pub host_mount_path: String,
    pub mount_target: String,
    pub memory_limit_mib: u64,
    pub cpu_limit_cores: f64,
}

/// A started container: a channel of raw log chunks (stdout+stderr,
/// unstripped) and a one-shot for its exit code. Both ends are consumed
/// concurrently by `JobExecutor`'s timeout race.
pub struct RunHandle {
    pub logs: mpsc::Receiver<Vec<u8>>,
    pub exit: oneshot::Receiver<Result<i64, SandboxError>>,
}

#[async_trait]
pub trait SandboxDriver: Send + Sync {
    /// Creates (but does not start) a container for the compile pre-pass.
    async fn build_compile_container(
        &self,
        spec: ContainerSpec,
    ) -> Result<ContainerHandle, SandboxError>;

    /// Creates (but does not start) the main run container.
    async fn build_run_container(
        &self,
        spec: ContainerSpec,
    ) -> Result<ContainerHandle, SandboxError>;

    /// Starts a created container, returning its log stream and exit
    /// future.
    async fn run(&self, handle: &ContainerHandle) -> Result<RunHandle, SandboxError>;

    /// Stop-then-remove, best-effort. Never returns an error: failures are
    /// logged and swallowed by the implementation.
    async fn dispose(&self, handle: &ContainerHandle);

    /// Container ids currently alive through this driver, for telemetry
    /// aggregation.
    async fn live_containers(&self) -> Vec<ContainerHandle>;

    /// Instantaneous CPU/memory usage for one container, as
    /// `(cpu_delta_fraction, memory_bytes)`. `cpu_delta_fraction` is the
    /// already-normalised `(cpuDelta / systemCpuDelta) * onlineCpus` value.
    async fn container_usage(&self, handle: &ContainerHandle) -> Result<(f64, u64), SandboxError>;
}

/// Builds the workspace-relative bind mount path used by every language
/// profile.
pub fn host_mount(workspace: &Path) -> String {
    workspace.to_string_lossy().into_owned()
}
