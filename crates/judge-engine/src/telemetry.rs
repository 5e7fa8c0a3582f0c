//! Host + container aggregate CPU/memory sampling for dispatcher admission
//! control.

use std::sync::Arc;

use judge_sandbox::SandboxDriver;
use parking_lot::Mutex;
use sysinfo::System;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to sample container usage: {0}")]
    Sandbox(#[from] judge_sandbox::SandboxError),
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ResourceSample {
    pub total: f64,
    pub used: f64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct TelemetrySnapshot {
    pub cpu: ResourceSample,
    pub memory: ResourceSample,
}

pub struct TelemetryProbe {
    sandbox: Arc<dyn SandboxDriver>,
    system: Mutex<System>,
}

impl TelemetryProbe {
    pub fn new(sandbox: Arc<dyn SandboxDriver>) -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        Self {
            sandbox,
            system: Mutex::new(system),
        }
    }

    /// Aggregates CPU/memory usage across every container the sandbox
    /// driver currently has alive, against cached host totals.
    pub async fn sample(&self) -> Result<TelemetrySnapshot, TelemetryError> {
        let (total_cpu, total_memory_mib) = {
            let system = self.system.lock();
            (system.cpus().len() as f64, system.total_memory() / 1024 / 1024)
        };

        let mut used_cpu = 0.0;
        let mut used_memory_bytes: u64 = 0;
        for container in self.sandbox.live_containers().await {
            let (cpu_fraction, memory_bytes) = self.sandbox.container_usage(&container).await?;
            used_cpu += cpu_fraction;
            used_memory_bytes += memory_bytes;
        }

        Ok(TelemetrySnapshot {
            cpu: ResourceSample {
                total: total_cpu,
                used: round2(used_cpu),
            },
            memory: ResourceSample {
                total: total_memory_mib as f64,
                used: (used_memory_bytes / 1024 / 1024) as f64,
            },
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use judge_sandbox::FakeSandboxDriver;

    #[tokio::test]
    async fn sample_with_no_live_containers_reports_zero_used() {
        let probe = TelemetryProbe::new(Arc::new(FakeSandboxDriver::new(vec![])));
        let snapshot = probe.sample().await.expect("sample");
        assert_eq!(snapshot.cpu.used, 0.0);
        assert_eq!(snapshot.memory.used, 0.0);
        assert!(snapshot.cpu.total > 0.0);
    }
}
