use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("container runtime refused to create container: {0}")]
    Create(String),

    #[error("container runtime refused to start container: {0}")]
    Start(String),

    #[error("failed to read container logs: {0}")]
    Logs(String),

    #[error("failed to await container exit: {0}")]
    Wait(String),

    #[error("failed to sample container stats: {0}")]
    Stats(String),
}
