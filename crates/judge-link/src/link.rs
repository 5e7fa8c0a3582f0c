//! The connection supervisor: a `Disconnected`/`Connecting`/`Connected`
//! state machine maintaining one WebSocket to the dispatcher, with
//! fixed-delay reconnect and drop-when-disconnected send semantics.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use judge_core::clock::Clock;
use judge_core::id::AgentId;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::protocol::{Inbound, Outbound, Resources};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

/// Supplies the resource snapshot attached to the `register` message sent
/// immediately on every successful connect.
#[async_trait]
pub trait RegisterSource: Send + Sync {
    async fn current_resources(&self) -> Resources;
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub dispatcher_url: String,
    pub reconnect_delay: Duration,
}

/// Shared, clonable view of the link's current state, for telemetry/logging
/// and for enforcing "at most one connect attempt in flight".
#[derive(Clone)]
pub struct LinkStatus(Arc<AtomicU8>);

impl LinkStatus {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(LinkState::Disconnected as u8)))
    }

    fn set(&self, state: LinkState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    pub fn get(&self) -> LinkState {
        match self.0.load(Ordering::SeqCst) {
            1 => LinkState::Connecting,
            2 => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }
}

/// Handle held by the agent coordinator: send outbound messages, read the
/// current state, and shut the supervisor down.
pub struct LinkHandle {
    outbound_tx: mpsc::Sender<Outbound>,
    status: LinkStatus,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl LinkHandle {
    /// Enqueues a message for send. If the link is not currently
    /// `Connected`, the message is dropped silently here — callers never
    /// buffer across reconnects themselves, and nothing sits in the
    /// channel waiting for the next successful connect.
    pub async fn send(&self, message: Outbound) {
        if self.status.get() != LinkState::Connected {
            debug!("link is not connected, dropping outbound message");
            return;
        }
        if self.outbound_tx.send(message).await.is_err() {
            warn!("link supervisor task is gone, dropping outbound message");
        }
    }

    pub fn state(&self) -> LinkState {
        self.status.get()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Spawns the supervisor task and returns the handle plus the inbound
/// message stream.
pub fn start(
    config: LinkConfig,
    agent_id: AgentId,
    clock: Arc<dyn Clock>,
    register_source: Arc<dyn RegisterSource>,
) -> (LinkHandle, mpsc::Receiver<Inbound>) {
    let (outbound_tx, outbound_rx) = mpsc::channel(128);
    let (inbound_tx, inbound_rx) = mpsc::channel(128);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let status = LinkStatus::new();

    tokio::spawn(run_supervisor(
        config,
        agent_id,
        clock,
        register_source,
        outbound_rx,
        inbound_tx,
        shutdown_rx,
        status.clone(),
    ));

    (
        LinkHandle {
            outbound_tx,
            status,
            shutdown_tx: Some(shutdown_tx),
        },
        inbound_rx,
    )
}

async fn run_supervisor(
    config: LinkConfig,
    agent_id: AgentId,
    clock: Arc<dyn Clock>,
    register_source: Arc<dyn RegisterSource>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    inbound_tx: mpsc::Sender<Inbound>,
    mut shutdown_rx: oneshot::Receiver<()>,
    status: LinkStatus,
) {
    loop {
        status.set(LinkState::Connecting);
        let connect_result = tokio_tungstenite::connect_async(&config.dispatcher_url)
            .await
            .map_err(|source| LinkError::Connect {
                url: config.dispatcher_url.clone(),
                source,
            });

        match connect_result {
            Ok((stream, _response)) => {
                status.set(LinkState::Connected);
                info!(url = %config.dispatcher_url, "connected to dispatcher");

                let (mut write, mut read) = stream.split();

                let register = Outbound::Register {
                    resources: register_source.current_resources().await,
                };
                if let Err(err) = send_stamped(&mut write, &register, &agent_id, clock.as_ref()).await {
                    warn!(error = %err, "failed to send register message");
                }

                let disconnected = run_connected_session(
                    &mut write,
                    &mut read,
                    &agent_id,
                    clock.as_ref(),
                    &mut outbound_rx,
                    &inbound_tx,
                    &mut shutdown_rx,
                )
                .await;

                status.set(LinkState::Disconnected);
                if disconnected.should_shutdown {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to connect to dispatcher");
                status.set(LinkState::Disconnected);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            _ = &mut shutdown_rx => return,
        }
    }
}

struct SessionEnd {
    should_shutdown: bool,
}

#[allow(clippy::too_many_arguments)]
async fn run_connected_session<S>(
    write: &mut futures_util::stream::SplitSink<S, Message>,
    read: &mut futures_util::stream::SplitStream<S>,
    agent_id: &AgentId,
    clock: &dyn Clock,
    outbound_rx: &mut mpsc::Receiver<Outbound>,
    inbound_tx: &mpsc::Sender<Inbound>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> SessionEnd
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + futures_util::Stream<
            Item = Result<Message, tokio_tungstenite::tungstenite::Error>,
        > + Unpin,
{
    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        if send_stamped(write, &message, agent_id, clock).await.is_err() {
                            return SessionEnd { should_shutdown: false };
                        }
                    }
                    None => return SessionEnd { should_shutdown: true },
                }
            }

            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_inbound_line(&text, inbound_tx).await,
                    Some(Ok(Message::Close(_))) | None => {
                        return SessionEnd { should_shutdown: false };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        let err = LinkError::Transport(err);
                        debug!(error = %err, "link read error");
                        return SessionEnd { should_shutdown: false };
                    }
                }
            }

            _ = &mut *shutdown_rx => {
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd { should_shutdown: true };
            }
        }
    }
}

async fn handle_inbound_line(text: &str, inbound_tx: &mpsc::Sender<Inbound>) {
    match serde_json::from_str::<Inbound>(text) {
        Ok(message) => {
            if inbound_tx.send(message).await.is_err() {
                warn!("agent coordinator is gone, dropping inbound message");
            }
        }
        Err(err) => {
            debug!(error = %err, line = text, "ignoring unrecognised inbound message");
        }
    }
}

async fn send_stamped<S>(
    write: &mut S,
    message: &Outbound,
    agent_id: &AgentId,
    clock: &dyn Clock,
) -> Result<(), LinkError>
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let mut value = serde_json::to_value(message).unwrap_or(serde_json::Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.insert("agentId".to_string(), serde_json::Value::String(agent_id.to_string()));
        object.insert(
            "timestamp".to_string(),
            serde_json::Value::Number(clock.now_millis().into()),
        );
    }
    let line = format!("{value}\n");
    write.send(Message::Text(line)).await.map_err(LinkError::Transport)
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
