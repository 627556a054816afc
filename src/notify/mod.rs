//! Notification bridge socket layer
//!
//! This module provides the Unix Domain Socket based protocol between
//! WSL-side clients and the bridge daemon: wire types, the one-shot
//! server and a small client.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::send_request;
pub use protocol::{NotifyRequest, NotifyResponse};
pub use server::{NotifyServer, MAX_REQUEST_BYTES};

/// Default socket path; overridable via the `WSL_NOTIFY_SOCK`
/// environment variable.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/wsl-notify.sock";
