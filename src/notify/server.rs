//! Unix domain socket server for the notification bridge

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use super::protocol::{NotifyRequest, NotifyResponse};
use crate::dispatch::Dispatcher;

/// A request must fit into a single read of this size.
///
/// The protocol has no framing: the client writes one JSON document and
/// the server reads it with one call. Larger or fragmented requests are
/// a documented protocol limit, not something that is reassembled.
pub const MAX_REQUEST_BYTES: usize = 4096;

/// Socket front end of the bridge; one connection carries exactly one
/// request/response exchange.
pub struct NotifyServer {
    socket_path: PathBuf,
    dispatcher: Arc<Dispatcher>,
}

impl NotifyServer {
    pub fn new(socket_path: impl Into<PathBuf>, dispatcher: Dispatcher) -> Self {
        Self {
            socket_path: socket_path.into(),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Bind the socket and serve connections until the process exits.
    ///
    /// Only startup failures (stale socket removal, bind) return an
    /// error; per-connection failures are logged and never stop the
    /// accept loop.
    pub async fn run(self) -> Result<()> {
        let listener = self.bind()?;
        info!("Listening on {}", self.socket_path.display());

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        handle_connection(stream, dispatcher).await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    fn bind(&self) -> Result<UnixListener> {
        // 既存のソケットファイルが残っていれば削除してからバインドする
        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => debug!("Removed stale socket file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "Failed to remove existing socket: {}",
                        self.socket_path.display()
                    )
                });
            }
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
        }

        UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind to socket: {}", self.socket_path.display()))
    }
}

/// One request, one response, then the connection is dropped.
///
/// Every failure past the read is answered with a `status:"error"`
/// response when possible; a client that is already gone only produces a
/// log line, never an error that could affect other connections.
async fn handle_connection(mut stream: UnixStream, dispatcher: Arc<Dispatcher>) {
    let mut buf = [0u8; MAX_REQUEST_BYTES];
    let n = match stream.read(&mut buf).await {
        Ok(0) => {
            // Client connected and left without sending anything
            debug!("Connection closed without a request");
            return;
        }
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to read request: {}", e);
            return;
        }
    };

    let response = match serde_json::from_slice::<NotifyRequest>(&buf[..n]) {
        Ok(req) => match dispatcher.dispatch(&req).await {
            Ok(()) => NotifyResponse::Ok,
            Err(e) => {
                warn!("Dispatch failed: {}", e);
                NotifyResponse::error(e)
            }
        },
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            NotifyResponse::error(format!("invalid request: {}", e))
        }
    };

    let body = match serde_json::to_vec(&response) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            return;
        }
    };

    // クライアントが既に切断している可能性があるため、書き込みエラーは無視する
    if let Err(e) = stream.write_all(&body).await {
        warn!("Failed to send response: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::testing::StaticSink;
    use crate::sink::NotificationSink;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    async fn start_server(sink: Box<dyn NotificationSink>) -> (PathBuf, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notify.sock");
        let server = NotifyServer::new(&path, Dispatcher::new(sink));
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        wait_for_socket(&path).await;
        (path, dir)
    }

    async fn wait_for_socket(path: &Path) {
        use std::os::unix::fs::FileTypeExt;
        for _ in 0..100 {
            let is_socket = std::fs::metadata(path)
                .map(|m| m.file_type().is_socket())
                .unwrap_or(false);
            if is_socket {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("server socket never appeared");
    }

    async fn exchange(path: &Path, request: &[u8]) -> Vec<u8> {
        let mut stream = UnixStream::connect(path).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_ok_round_trip() {
        let sink = StaticSink::ok();
        let shown = sink.shown.clone();
        let (path, _dir) = start_server(Box::new(sink)).await;

        let response = exchange(&path, br#"{"title":"T","message":"M"}"#).await;
        let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
        assert!(response.is_ok());

        let shown = shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].contains("<text>T</text>"));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_error_response() {
        let (path, _dir) = start_server(Box::new(StaticSink::ok())).await;

        let response = exchange(&path, b"this is not json").await;
        let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
        match response {
            NotifyResponse::Error { error } => assert!(error.contains("invalid request")),
            NotifyResponse::Ok => panic!("expected an error response"),
        }
    }

    #[tokio::test]
    async fn test_sink_failure_is_reported_to_client() {
        let (path, _dir) = start_server(Box::new(StaticSink::failing(1, "boom"))).await;

        let response = exchange(&path, br#"{"title":"T","message":"M"}"#).await;
        let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
        match response {
            NotifyResponse::Error { error } => assert!(error.contains("boom")),
            NotifyResponse::Ok => panic!("expected an error response"),
        }
    }

    #[tokio::test]
    async fn test_immediate_eof_gets_no_response() {
        let (path, _dir) = start_server(Box::new(StaticSink::ok())).await;

        let mut stream = UnixStream::connect(&path).await.unwrap();
        stream.shutdown().await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_request_gets_error_response() {
        let (path, _dir) = start_server(Box::new(StaticSink::ok())).await;

        // valid JSON overall, but only the first 4096 bytes are read,
        // which truncates it into a malformed document
        let padding = "x".repeat(MAX_REQUEST_BYTES);
        let request = format!(r#"{{"title":"T","message":"{}"}}"#, padding);

        let response = exchange(&path, request.as_bytes()).await;
        let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_stale_socket_file_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notify.sock");
        std::fs::write(&path, b"stale").unwrap();

        let server = NotifyServer::new(&path, Dispatcher::new(Box::new(StaticSink::ok())));
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        wait_for_socket(&path).await;

        let response = exchange(&path, br#"{"title":"T","message":"M"}"#).await;
        let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_serves_connections_sequentially_arriving() {
        let sink = StaticSink::ok();
        let shown = sink.shown.clone();
        let (path, _dir) = start_server(Box::new(sink)).await;

        for i in 0..3 {
            let request = format!(r#"{{"title":"T{}","message":"M"}}"#, i);
            let response = exchange(&path, request.as_bytes()).await;
            let response: NotifyResponse = serde_json::from_slice(&response).unwrap();
            assert!(response.is_ok());
        }

        assert_eq!(shown.lock().unwrap().len(), 3);
    }
}
