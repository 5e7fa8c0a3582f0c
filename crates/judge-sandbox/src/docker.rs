//! `SandboxDriver` implemented against a local Docker Engine via `bollard`.
//! Containers here are one-shot: created with the compile/run argv as the
//! entrypoint command, started, and awaited to completion — there is no
//! long-lived "sleep infinity" + exec step, since the harness is the whole
//! point of the container's lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StopContainerOptions, WaitContainerOptions,
};
use bollard::models::{HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use futures_util::stream::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::driver::{ContainerHandle, ContainerSpec, RunHandle, SandboxDriver};
use crate::error::SandboxError;

/// Live Docker-backed sandbox driver. One instance is shared across all
/// jobs; `bollard::Docker` is internally a cheap, cloneable HTTP client.
pub struct DockerSandboxDriver {
    docker: Docker,
    live: Mutex<HashMap<String, ()>>,
}

impl DockerSandboxDriver {
    pub fn connect_local() -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|err| SandboxError::Create(err.to_string()))?;
        Ok(Self {
            docker,
            live: Mutex::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    pub fn from_client(docker: Docker) -> Self {
        Self {
            docker,
            live: Mutex::new(HashMap::new()),
        }
    }

    async fn create(&self, spec: ContainerSpec) -> Result<ContainerHandle, SandboxError> {
        let name = format!("judge-{}", Uuid::new_v4());

        let host_config = HostConfig {
            memory: Some((spec.memory_limit_mib * 1024 * 1024) as i64),
            cpu_quota: Some((spec.cpu_limit_cores * 100_000.0) as i64),
            cpu_period: Some(100_000),
            network_mode: Some("none".to_string()),
            mounts: Some(vec![Mount {
                target: Some(spec.mount_target.clone()),
                source: Some(spec.host_mount_path.clone()),
                typ: Some(MountTypeEnum::BIND),
                ..Default::default()
            }]),
            privileged: Some(false),
            security_opt: Some(vec!["no-new-privileges:true".to_string()]),
            cap_drop: Some(vec!["ALL".to_string()]),
            auto_remove: Some(true),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            working_dir: Some(spec.workdir.clone()),
            cmd: Some(spec.argv.clone()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: name.clone(),
            platform: None,
        };

        self.docker
            .create_container(Some(options), config)
            .await
            .map_err(|err| SandboxError::Create(err.to_string()))?;

        self.live.lock().insert(name.clone(), ());
        Ok(ContainerHandle(name))
    }
}

#[async_trait]
impl SandboxDriver for DockerSandboxDriver {
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

    async fn run(&self, handle: &ContainerHandle) -> Result<RunHandle, SandboxError> {
        self.docker
            .start_container::<String>(handle.id(), None)
            .await
            .map_err(|err| SandboxError::Start(err.to_string()))?;

        let (log_tx, log_rx) = mpsc::channel(64);
        let (exit_tx, exit_rx) = oneshot::channel();

        let docker = self.docker.clone();
        let id = handle.id().to_string();

        tokio::spawn(async move {
            let mut logs = docker.logs(
                &id,
                Some(LogsOptions::<String> {
                    follow: true,
                    stdout: true,
                    stderr: true,
                    ..Default::default()
                }),
            );
            while let Some(chunk) = logs.next().await {
                match chunk {
                    Ok(LogOutput::StdOut { message } | LogOutput::StdErr { message }) => {
                        if log_tx.send(message.to_vec()).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        debug!(error = %err, "log stream ended");
                        break;
                    }
                }
            }
            drop(log_tx);
        });

        let docker = self.docker.clone();
        let id = handle.id().to_string();
        tokio::spawn(async move {
            let mut waits = docker.wait_container(&id, None::<WaitContainerOptions<String>>);
            let result = match waits.next().await {
                Some(Ok(body)) => Ok(body.status_code),
                Some(Err(err)) => Err(SandboxError::Wait(err.to_string())),
                None => Ok(0),
            };
            let _ = exit_tx.send(result);
        });

        Ok(RunHandle {
            logs: log_rx,
            exit: exit_rx,
        })
    }

    async fn dispose(&self, handle: &ContainerHandle) {
        let _ = self
            .docker
            .stop_container(handle.id(), Some(StopContainerOptions { t: 5 }))
            .await;
        if let Err(err) = self
            .docker
            .remove_container(
                handle.id(),
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            warn!(container = handle.id(), error = %err, "failed to remove container");
        }
        self.live.lock().remove(handle.id());
    }

    async fn live_containers(&self) -> Vec<ContainerHandle> {
        self.live
            .lock()
            .keys()
            .map(|id| ContainerHandle(id.clone()))
            .collect()
    }

    /// CPU/memory usage, computed from two successive streamed `stats()`
    /// snapshots. Docker's one-shot stats mode skips the two-cycle wait and
    /// returns a zeroed `precpu_stats`, which would make a single-sample
    /// delta meaningless — so this reads the stream twice instead.
    async fn container_usage(&self, handle: &ContainerHandle) -> Result<(f64, u64), SandboxError> {
        let mut stats = self.docker.stats(
            handle.id(),
            Some(bollard::container::StatsOptions {
                stream: true,
                one_shot: false,
            }),
        );

        let first = stats
            .next()
            .await
            .ok_or_else(|| SandboxError::Stats("no stats sample".to_string()))?
            .map_err(|err| SandboxError::Stats(err.to_string()))?;
        let second = stats
            .next()
            .await
            .ok_or_else(|| SandboxError::Stats("only one stats sample available".to_string()))?
            .map_err(|err| SandboxError::Stats(err.to_string()))?;

        let cpu_delta = second.cpu_stats.cpu_usage.total_usage as f64
            - first.cpu_stats.cpu_usage.total_usage as f64;
        let system_delta = second.cpu_stats.system_cpu_usage.unwrap_or(0) as f64
            - first.cpu_stats.system_cpu_usage.unwrap_or(0) as f64;
        let online_cpus = second.cpu_stats.online_cpus.unwrap_or(1) as f64;
        let cpu_fraction = if system_delta > 0.0 {
            (cpu_delta / system_delta) * online_cpus
        } else {
            0.0
        };
        let memory_bytes = second.memory_stats.usage.unwrap_or(0);
        Ok((cpu_fraction, memory_bytes))
    }
}

#[allow(dead_code)]
fn _assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn _driver_is_send_sync() {
    _assert_send_sync::<Arc<DockerSandboxDriver>>();
}
