//! The dispatcher connection supervisor: a reconnecting WebSocket client
//! speaking newline-delimited JSON, with drop-when-disconnected send
//! semantics and a `register`-on-connect handshake.
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod link;
pub mod protocol;

pub use error::LinkError;
pub use link::{start, LinkConfig, LinkHandle, LinkState, RegisterSource};
pub use protocol::{Inbound, LangConfig, Metrics, Outbound, ResourceMetric, Resources, TaskMetrics};
