//! Wire shapes for the dispatcher connection. Outbound variants never carry
//! `agentId`/`timestamp` themselves — the link's send path stamps both onto
//! the serialised object just before it goes out, so callers can't forget.

use judge_core::model::{Job, JobOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub cpu: i64,
    pub memory: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetric {
    pub total: f64,
    pub used: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub cpu: ResourceMetric,
    pub memory: ResourceMetric,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LangConfig {
    pub cpu_limit: f64,
    pub memory_limit: u64,
    pub timeout: u64,
    pub image: String,
    pub file_extension: String,
    pub run_command: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    pub execution_time: u64,
    pub language: String,
    pub resources: Metrics,
    pub lang_config: LangConfig,
}

/// Messages the agent sends to the dispatcher.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    Register {
        resources: Resources,
    },
    ResourceUpdate {
        metrics: Metrics,
    },
    TaskComplete {
        task_id: String,
        result: JobOutcome,
        metrics: TaskMetrics,
    },
    TaskError {
        task_id: String,
        error: String,
        language: String,
        resources: Metrics,
    },
    Error {
        error: String,
    },
}

/// Messages the dispatcher sends to the agent. Unknown `type` values decode
/// to `None` at the call site and are logged, never treated as fatal.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    Task { task: Job },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbound_task_decodes() {
        let raw = json!({
            "type": "task",
            "task": {"id": "j1", "language": "python", "code": "x", "testCases": []}
        });
        let inbound: Inbound = serde_json::from_value(raw).expect("decode");
        matches!(inbound, Inbound::Task { .. });
    }

    #[test]
    fn unknown_inbound_type_fails_to_decode() {
        let raw = json!({"type": "ping"});
        let result: Result<Inbound, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }

    #[test]
    fn outbound_register_serialises_with_type_tag() {
        let message = Outbound::Register {
            resources: Resources { cpu: 4, memory: 8192 },
        };
        let value = serde_json::to_value(&message).expect("serialise");
        assert_eq!(value["type"], "register");
        assert_eq!(value["resources"]["cpu"], 4);
    }

    fn sample_metrics() -> Metrics {
        Metrics {
            cpu: ResourceMetric { total: 4.0, used: 1.0 },
            memory: ResourceMetric { total: 8192.0, used: 512.0 },
        }
    }

    #[yare::parameterized(
        register = { Outbound::Register { resources: Resources { cpu: 4, memory: 8192 } }, "register" },
        resource_update = { Outbound::ResourceUpdate { metrics: sample_metrics() }, "resourceUpdate" },
        task_error = { Outbound::TaskError { task_id: "t1".to_string(), error: "boom".to_string(), language: "python".to_string(), resources: sample_metrics() }, "taskError" },
        error = { Outbound::Error { error: "boom".to_string() }, "error" },
    )]
    fn outbound_variant_serialises_with_expected_type_tag(message: Outbound, expected_type: &str) {
        let value = serde_json::to_value(&message).expect("serialise");
        assert_eq!(value["type"], expected_type);
    }
}
