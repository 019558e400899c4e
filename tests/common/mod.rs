//! Shared test fixtures.
//!
//! - [`StubEndpoint`]: WebSocket server standing in for a debug target
//! - [`StubHttp`]: minimal HTTP server standing in for the metadata endpoint

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for any single wait in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chromectl=debug")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// StubEndpoint
// ============================================================================

/// A bound WebSocket server that has not accepted its peer yet.
pub struct StubEndpoint {
    listener: TcpListener,
    port: u16,
}

impl StubEndpoint {
    /// Binds to a random localhost port.
    pub async fn bind() -> Self {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind stub endpoint");
        let port = listener.local_addr().expect("local addr").port();
        Self { listener, port }
    }

    /// Returns the URL clients should connect to.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/devtools/page/STUB", self.port)
    }

    /// Accepts one client and completes the WebSocket handshake.
    pub async fn accept(self) -> StubPeer {
        let (stream, _) = timeout(TEST_TIMEOUT, self.listener.accept())
            .await
            .expect("client connects in time")
            .expect("accept");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("websocket upgrade");
        StubPeer { ws }
    }
}

// ============================================================================
// StubPeer
// ============================================================================

/// Server side of an accepted WebSocket.
pub struct StubPeer {
    ws: WebSocketStream<TcpStream>,
}

impl StubPeer {
    /// Receives the next text frame as JSON.
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let message = timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .expect("message in time")
                .expect("stream open")
                .expect("valid frame");

            if let Message::Text(text) = message {
                return serde_json::from_str(&text).expect("client sends JSON");
            }
        }
    }

    /// Receives `count` requests.
    pub async fn recv_requests(&mut self, count: usize) -> Vec<Value> {
        let mut requests = Vec::with_capacity(count);
        for _ in 0..count {
            requests.push(self.recv_json().await);
        }
        requests
    }

    /// Sends a JSON text frame.
    pub async fn send_json(&mut self, value: Value) {
        self.send_text(value.to_string()).await;
    }

    /// Sends a raw text frame.
    pub async fn send_text(&mut self, text: impl Into<String>) {
        self.ws
            .send(Message::Text(text.into().into()))
            .await
            .expect("stub send");
    }

    /// Replies to `request` with `result`.
    pub async fn reply(&mut self, request: &Value, result: Value) {
        let id = request["id"].clone();
        self.send_json(serde_json::json!({"id": id, "result": result}))
            .await;
    }

    /// Sends a close frame.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    /// Waits until the client closes the socket.
    pub async fn expect_closed(&mut self) {
        loop {
            match timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .expect("close in time")
            {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    }
}

/// Binds a stub, opens a connection to it and accepts the peer.
pub async fn connected_pair() -> (chromectl::Connection, StubPeer) {
    init_tracing();
    let endpoint = StubEndpoint::bind().await;
    let url = endpoint.ws_url();

    let (connection, peer) = tokio::join!(chromectl::Connection::connect(&url), endpoint.accept());
    (connection.expect("connection opens"), peer)
}

// ============================================================================
// StubHttp
// ============================================================================

/// Canned HTTP response.
#[derive(Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Serves one canned response to every request and records request lines.
pub struct StubHttp {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubHttp {
    pub async fn serve(response: CannedResponse) -> Self {
        init_tracing();
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind stub http");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let response = response.clone();
                tokio::spawn(async move {
                    Self::respond(stream, response, recorded).await;
                });
            }
        });

        Self { port, requests }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request lines received so far, e.g. `GET /json HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    async fn respond(
        mut stream: TcpStream,
        response: CannedResponse,
        recorded: Arc<Mutex<Vec<String>>>,
    ) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }

        let head = String::from_utf8_lossy(&buf);
        if let Some(line) = head.lines().next() {
            recorded.lock().push(line.to_string());
        }

        let reply = format!(
            "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status,
            response.body.len(),
            response.body
        );
        let _ = stream.write_all(reply.as_bytes()).await;
        let _ = stream.shutdown().await;
    }
}

/// Returns a localhost port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .expect("bind");
    listener.local_addr().expect("local addr").port()
}
