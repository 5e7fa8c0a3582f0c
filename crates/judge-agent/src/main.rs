//! Process entry point: logging setup, configuration load, agent run loop.

mod agent;
mod config;

use tracing_subscriber::EnvFilter;

use crate::agent::Agent;
use crate::config::Config;

/// Sets up structured logging to stdout, plus a rolling file appender when
/// `AGENT_LOG_DIR` is set. Returns the appender's flush guard — it must
/// stay alive for the process lifetime or buffered lines are lost on exit.
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("AGENT_LOG_DIR") {
        Ok(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "judge-agent.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = setup_logging();
    let config = Config::load();
    let agent = Agent::new(config)?;
    agent.run().await
}
