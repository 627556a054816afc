//! Client side of the notification socket protocol

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::protocol::{NotifyRequest, NotifyResponse};
use super::server::MAX_REQUEST_BYTES;

/// Send one notification request and wait for the server's response
///
/// The request is written as a single JSON document; the server closes
/// the connection after its response, so the reply is read to EOF.
pub fn send_request(socket_path: &Path, req: &NotifyRequest) -> Result<NotifyResponse> {
    let mut stream = UnixStream::connect(socket_path)
        .with_context(|| format!("Failed to connect to socket: {}", socket_path.display()))?;

    stream
        .set_write_timeout(Some(Duration::from_secs(5)))
        .context("Failed to set write timeout")?;

    let json = serde_json::to_vec(req).context("Failed to serialize request")?;
    if json.len() > MAX_REQUEST_BYTES {
        anyhow::bail!(
            "Request is {} bytes, exceeding the {} byte protocol limit",
            json.len(),
            MAX_REQUEST_BYTES
        );
    }

    stream.write_all(&json).context("Failed to write request")?;
    stream.flush().context("Failed to flush stream")?;

    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .context("Failed to read response")?;
    if buf.is_empty() {
        anyhow::bail!("Server closed the connection without a response");
    }

    serde_json::from_slice(&buf).context("Failed to parse response")
}
