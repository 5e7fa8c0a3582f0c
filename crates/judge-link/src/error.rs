use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to connect to dispatcher at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}
