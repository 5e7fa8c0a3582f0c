//! Process configuration: dispatcher URL, workspace root, reconnect delay,
//! and an optional language-profile override file, all overridable via
//! environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub dispatcher_url: String,
    pub workspace_root: PathBuf,
    pub reconnect_delay: Duration,
    pub language_profiles_path: Option<PathBuf>,
    pub workspace_sweep_grace: Duration,
}

impl Config {
    /// Reads configuration from the environment, falling back to defaults
    /// that work for local development against a dispatcher on localhost.
    pub fn load() -> Self {
        let dispatcher_url = std::env::var("AGENT_DISPATCHER_URL")
            .unwrap_or_else(|_| "ws://127.0.0.1:8080/agent".to_string());

        let workspace_root = std::env::var("AGENT_WORKSPACE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./temp"));

        let reconnect_delay = std::env::var("AGENT_RECONNECT_DELAY_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(1_000));

        let language_profiles_path = std::env::var("AGENT_LANGUAGE_PROFILES")
            .ok()
            .map(PathBuf::from);

        let workspace_sweep_grace = std::env::var("AGENT_WORKSPACE_SWEEP_GRACE_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(3_600));

        Self {
            dispatcher_url,
            workspace_root,
            reconnect_delay,
            language_profiles_path,
            workspace_sweep_grace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_falls_back_to_defaults_when_env_is_unset() {
        std::env::remove_var("AGENT_DISPATCHER_URL");
        std::env::remove_var("AGENT_RECONNECT_DELAY_MS");
        let config = Config::load();
        assert_eq!(config.reconnect_delay, Duration::from_millis(1_000));
        assert!(config.dispatcher_url.starts_with("ws://"));
    }
}
