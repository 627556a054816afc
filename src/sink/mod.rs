//! Abstraction over the host-side notification mechanism
//!
//! The daemon core only ever hands a finished toast XML document to this
//! interface. Keeping the seam this narrow means the dispatcher and the
//! socket server are testable without a Windows host.

pub mod powershell;

use async_trait::async_trait;
use thiserror::Error;

pub use powershell::PowerShellSink;

/// Failure reported by the notification host
#[derive(Debug, Error)]
pub enum SinkError {
    /// The host process could not be spawned at all
    #[error("failed to invoke notification host: {0}")]
    Spawn(#[from] std::io::Error),
    /// The host process ran but reported failure
    #[error("notification host exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

/// Something that can display one toast document
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(&self, xml: &str) -> Result<(), SinkError>;
}
