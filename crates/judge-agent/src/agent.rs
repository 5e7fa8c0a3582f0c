//! Top-level coordinator: owns identity, holds the dispatcher link,
//! dispatches inbound `task` messages to the job executor, and publishes
//! telemetry around each job.

use std::sync::Arc;

use async_trait::async_trait;
use judge_core::clock::{Clock, SystemClock};
use judge_core::id::AgentId;
use judge_core::model::Job;
use judge_engine::{JobExecutor, Registry, TelemetryProbe, WorkspaceManager};
use judge_link::{
    Inbound, LangConfig, LinkConfig, LinkHandle, Metrics, Outbound, RegisterSource, ResourceMetric,
    Resources, TaskMetrics,
};
use judge_sandbox::{DockerSandboxDriver, SandboxDriver};
use tracing::{error, info, warn};

use crate::config::Config;

struct TelemetryRegisterSource(Arc<TelemetryProbe>);

#[async_trait]
impl RegisterSource for TelemetryRegisterSource {
    async fn current_resources(&self) -> Resources {
        match self.0.sample().await {
            Ok(snapshot) => Resources {
                cpu: snapshot.cpu.total as i64,
                memory: snapshot.memory.total as i64,
            },
            Err(err) => {
                warn!(error = %err, "failed to sample telemetry for register message");
                Resources { cpu: 0, memory: 0 }
            }
        }
    }
}

pub struct Agent {
    id: AgentId,
    config: Config,
    registry: Arc<Registry>,
    sandbox: Arc<dyn SandboxDriver>,
    workspace: Arc<WorkspaceManager>,
    telemetry: Arc<TelemetryProbe>,
    clock: Arc<dyn Clock>,
}

impl Agent {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sandbox: Arc<dyn SandboxDriver> = Arc::new(DockerSandboxDriver::connect_local()?);
        let registry = match &config.language_profiles_path {
            Some(path) => Arc::new(Registry::from_file(path)?),
            None => Arc::new(Registry::default()),
        };
        let workspace = Arc::new(WorkspaceManager::new(config.workspace_root.clone()));
        workspace.sweep_stale(config.workspace_sweep_grace);

        let telemetry = Arc::new(TelemetryProbe::new(sandbox.clone()));

        Ok(Self {
            id: AgentId::generate(),
            config,
            registry,
            sandbox,
            workspace,
            telemetry,
            clock: Arc::new(SystemClock),
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let link_config = LinkConfig {
            dispatcher_url: self.config.dispatcher_url.clone(),
            reconnect_delay: self.config.reconnect_delay,
        };

        let register_source: Arc<dyn RegisterSource> =
            Arc::new(TelemetryRegisterSource(self.telemetry.clone()));

        let (link, mut inbound) =
            judge_link::start(link_config, self.id.clone(), self.clock.clone(), register_source);
        let link = Arc::new(link);

        let executor = Arc::new(JobExecutor::new(
            self.registry.clone(),
            self.sandbox.clone(),
            self.workspace.clone(),
        ));

        info!(agent_id = %self.id, "agent running");

        loop {
            tokio::select! {
                message = inbound.recv() => {
                    match message {
                        Some(Inbound::Task { task }) => {
                            let executor = executor.clone();
                            let link = link.clone();
                            let telemetry = self.telemetry.clone();
                            let registry = self.registry.clone();
                            tokio::spawn(async move {
                                handle_task(executor, link, telemetry, registry, task).await;
                            });
                        }
                        None => {
                            warn!("link supervisor shut down, stopping agent");
                            return Ok(());
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received, in-flight jobs continue to completion");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_task(
    executor: Arc<JobExecutor>,
    link: Arc<LinkHandle>,
    telemetry: Arc<TelemetryProbe>,
    registry: Arc<Registry>,
    job: Job,
) {
    let task_id = job.id.to_string();
    let language = job.language.clone();
    let lang_config = registry.get(&language).map(|profile| LangConfig {
        cpu_limit: profile.cpu_limit_cores,
        memory_limit: profile.memory_limit_mi_b,
        timeout: profile.timeout_millis,
        image: profile.image.clone(),
        file_extension: profile.file_extension.clone(),
        run_command: profile
            .run_argv
            .iter()
            .chain(std::iter::once(&profile.run_target))
            .cloned()
            .collect::<Vec<_>>()
            .join(" "),
    });

    publish_resource_update(&link, &telemetry).await;

    match executor.execute(job).await {
        Ok(outcome) => {
            publish_resource_update(&link, &telemetry).await;
            let metrics = TaskMetrics {
                execution_time: outcome.execution_time,
                language: language.clone(),
                resources: sample_metrics(&telemetry).await,
                lang_config: lang_config.unwrap_or(LangConfig {
                    cpu_limit: 0.0,
                    memory_limit: 0,
                    timeout: 0,
                    image: String::new(),
                    file_extension: String::new(),
                    run_command: String::new(),
                }),
            };
            link.send(Outbound::TaskComplete {
                task_id: task_id.clone(),
                result: outcome,
                metrics,
            })
            .await;
        }
        Err(err) => {
            error!(task_id = %task_id, error = %err, "job failed");
            link.send(Outbound::TaskError {
                task_id: task_id.clone(),
                error: err.to_string(),
                language,
                resources: sample_metrics(&telemetry).await,
            })
            .await;
        }
    }

    publish_resource_update(&link, &telemetry).await;
}

async fn publish_resource_update(link: &LinkHandle, telemetry: &TelemetryProbe) {
    link.send(Outbound::ResourceUpdate {
        metrics: sample_metrics(telemetry).await,
    })
    .await;
}

async fn sample_metrics(telemetry: &TelemetryProbe) -> Metrics {
    match telemetry.sample().await {
        Ok(snapshot) => Metrics {
            cpu: ResourceMetric {
                total: snapshot.cpu.total,
                used: snapshot.cpu.used,
            },
            memory: ResourceMetric {
                total: snapshot.memory.total,
                used: snapshot.memory.used,
            },
        },
        Err(err) => {
            warn!(error = %err, "telemetry sample failed, publishing zeroed metrics");
            Metrics {
                cpu: ResourceMetric { total: 0.0, used: 0.0 },
                memory: ResourceMetric { total: 0.0, used: 0.0 },
            }
        }
    }
}
