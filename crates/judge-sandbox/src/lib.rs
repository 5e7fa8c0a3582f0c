//! Container sandbox driver: creates, starts, streams logs from, and tears
//! down a hardened container per job, against either a real Docker daemon
//! or an in-memory fake for tests.
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod docker;
pub mod driver;
pub mod error;
pub mod fake;

pub use docker::DockerSandboxDriver;
pub use driver::{ContainerHandle, ContainerSpec, RunHandle, SandboxDriver};
pub use error::SandboxError;
pub use fake::{FakeSandboxDriver, ScriptedRun};
