//! WebSocket connection and receive loop.
//!
//! This module owns the socket to a debug target, including
//! command/response correlation and event delivery.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──open──► Open ──close / socket error──► Closed
//! ```
//!
//! `Closed` is terminal. Closing is idempotent and fails every pending
//! command with [`Error::ConnectionClosed`].
//!
//! # Receive Loop
//!
//! [`Connection::open`] spawns exactly one tokio task that:
//!
//! - Reads inbound messages one at a time
//! - Resolves the pending command whose id matches a response
//! - Awaits the event handler for each event before reading the next message
//!
//! Because the loop awaits the handler, events are delivered in arrival
//! order and never overlap. A slow handler delays every later message,
//! including responses. Awaiting [`Connection::send`] from inside the handler
//! therefore never completes; spawn such work instead.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{FutureExt, SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, to_string};
use tokio::net::TcpStream;
use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, CommandIdSequence};
use crate::protocol::{Event, Inbound, Request, Response};

use super::subscription::EventStream;

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Map of command IDs to response slots.
type PendingMap = FxHashMap<CommandId, oneshot::Sender<Result<Response>>>;

/// Event handler callback type.
///
/// Called for each event received while the connection is open. The
/// receive loop awaits the returned future before reading the next message.
pub type EventHandler = Arc<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Constructed, socket not yet established.
    Idle,
    /// Socket established, receive loop running.
    Open,
    /// Socket released. Terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

// ============================================================================
// Inner State
// ============================================================================

/// State guarded by one lock so that closing, registering a command and
/// installing a handler are atomic with respect to each other.
struct Lifecycle {
    state: ConnectionState,
    pending: PendingMap,
    event_handler: Option<EventHandler>,
}

struct Inner {
    lifecycle: Mutex<Lifecycle>,
    ids: CommandIdSequence,
    /// Set once by the first `open` call.
    started: AtomicBool,
    writer: AsyncMutex<Option<WsSink>>,
    shutdown: watch::Sender<bool>,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a debug target.
///
/// Handles command/response correlation and event delivery.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share the same
/// socket, pending map and handler slot. Any number of tasks may await
/// [`send`](Self::send) concurrently.
///
/// Dropping the last handle does not close the socket; call
/// [`close`](Self::close).
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle = self.inner.lifecycle.lock();
        f.debug_struct("Connection")
            .field("state", &lifecycle.state)
            .field("pending", &lifecycle.pending.len())
            .field("has_event_handler", &lifecycle.event_handler.is_some())
            .finish()
    }
}

impl Connection {
    /// Creates an idle connection.
    #[must_use]
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                lifecycle: Mutex::new(Lifecycle {
                    state: ConnectionState::Idle,
                    pending: PendingMap::default(),
                    event_handler: None,
                }),
                ids: CommandIdSequence::new(),
                started: AtomicBool::new(false),
                writer: AsyncMutex::new(None),
                shutdown,
            }),
        }
    }

    /// Creates a connection and opens it against `ws_url`.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let connection = Self::new();
        connection.open(ws_url).await?;
        Ok(connection)
    }

    /// Establishes the socket and starts the receive loop.
    ///
    /// Returns once the socket is open and the loop is running.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] / [`Error::InvalidArgument`] if `ws_url` is not a `ws://` or `wss://` URL
    /// - [`Error::InvalidState`] if `open` was already called successfully or is in progress
    /// - [`Error::Transport`] if the WebSocket handshake fails; the connection stays idle
    /// - [`Error::ConnectionClosed`] if the connection was closed while connecting
    pub async fn open(&self, ws_url: &str) -> Result<()> {
        let url = Url::parse(ws_url)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_argument(format!(
                "expected ws:// or wss:// URL, got {ws_url}"
            )));
        }

        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Err(Error::invalid_state("open", self.state()));
        }

        {
            let lifecycle = self.inner.lifecycle.lock();
            if lifecycle.state != ConnectionState::Idle {
                return Err(Error::invalid_state("open", lifecycle.state));
            }
        }

        let ws_stream = match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                // Still Idle, so a later open may retry.
                self.inner.started.store(false, Ordering::Release);
                return Err(Error::transport(format!("WebSocket handshake failed: {e}")));
            }
        };

        let (sink, source) = ws_stream.split();
        *self.inner.writer.lock().await = Some(sink);

        let closed_while_connecting = {
            let mut lifecycle = self.inner.lifecycle.lock();
            if lifecycle.state == ConnectionState::Closed {
                true
            } else {
                lifecycle.state = ConnectionState::Open;
                false
            }
        };

        if closed_while_connecting {
            self.inner.release_writer().await;
            return Err(Error::ConnectionClosed);
        }

        let shutdown_rx = self.inner.shutdown.subscribe();
        tokio::spawn(Inner::run_receive_loop(
            Arc::clone(&self.inner),
            source,
            shutdown_rx,
        ));

        info!(url = %url, "Connection opened");
        Ok(())
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lifecycle.lock().state
    }

    /// Returns `true` while the connection is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Returns the number of commands awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lifecycle.lock().pending.len()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Sends a command and waits for its result.
    ///
    /// No timeout is applied; see [`send_with_timeout`](Self::send_with_timeout).
    ///
    /// # Errors
    ///
    /// - [`Error::RemoteCommand`] if the remote end answers with an error
    /// - [`Error::ConnectionClosed`] if the connection closes first
    /// - [`Error::Transport`] if writing to the socket fails
    /// - [`Error::InvalidState`] if the connection was never opened
    pub async fn send(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let (_, response_rx) = self.dispatch(method, params).await?;
        Self::await_response(method, response_rx).await
    }

    /// Sends a command and waits at most `request_timeout` for its result.
    ///
    /// On expiry the pending entry is left in place; a late response is
    /// discarded and close still accounts for it.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - Otherwise as [`send`](Self::send)
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        request_timeout: Duration,
    ) -> Result<Value> {
        let (command_id, response_rx) = self.dispatch(method, params).await?;

        match timeout(request_timeout, Self::await_response(method, response_rx)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%command_id, method, "Command timed out");
                Err(Error::request_timeout(command_id, saturating_millis(request_timeout)))
            }
        }
    }

    /// Registers a pending entry and writes the request.
    async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<(CommandId, oneshot::Receiver<Result<Response>>)> {
        let (response_tx, response_rx) = oneshot::channel();

        let command_id = {
            let mut lifecycle = self.inner.lifecycle.lock();
            match lifecycle.state {
                ConnectionState::Open => {}
                ConnectionState::Closed => return Err(Error::ConnectionClosed),
                state @ ConnectionState::Idle => return Err(Error::invalid_state("send", state)),
            }
            let command_id = self.inner.ids.next();
            lifecycle.pending.insert(command_id, response_tx);
            command_id
        };

        let request = Request::new(command_id, method, params);
        let write_result = match to_string(&request) {
            Ok(json) => self.inner.write(json).await,
            Err(e) => Err(Error::Json(e)),
        };

        if let Err(e) = write_result {
            let still_pending = self.inner.lifecycle.lock().pending.remove(&command_id);
            if still_pending.is_none() {
                // Close drained the entry first.
                return Err(Error::ConnectionClosed);
            }

            if matches!(e, Error::Transport { .. }) {
                warn!(%command_id, method, error = %e, "Socket write failed");
                self.inner.finalize("write failure");
                self.inner.release_writer().await;
            }
            return Err(e);
        }

        trace!(%command_id, method, "Command sent");
        Ok((command_id, response_rx))
    }

    async fn await_response(
        method: &str,
        response_rx: oneshot::Receiver<Result<Response>>,
    ) -> Result<Value> {
        match response_rx.await {
            Ok(Ok(response)) => response.into_result(method),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::ConnectionClosed),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Sets the event handler, replacing any previous one.
    ///
    /// May be called before or after [`open`](Self::open). Events are only
    /// dispatched while the connection is open. A handler set after close is
    /// dropped immediately.
    ///
    /// A panic in the handler, whether raised while building the future or
    /// while polling it, is logged and the event skipped. This relies on
    /// `panic = "unwind"`; under `panic = "abort"` the process exits instead.
    pub fn set_event_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |event| handler(event).boxed());

        let mut lifecycle = self.inner.lifecycle.lock();
        if lifecycle.state == ConnectionState::Closed {
            debug!("Event handler ignored on closed connection");
            return;
        }
        lifecycle.event_handler = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        self.inner.lifecycle.lock().event_handler = None;
    }

    /// Replaces the event handler with a bounded channel and returns its
    /// receiving end.
    ///
    /// The stream ends when the handler is cleared or replaced, or when the
    /// connection closes. A full channel holds up the receive loop; events
    /// are never dropped.
    pub fn subscribe(&self, capacity: usize) -> EventStream {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));

        self.set_event_handler(move |event| {
            let event_tx = event_tx.clone();
            async move {
                if event_tx.send(event).await.is_err() {
                    trace!("Event subscriber dropped");
                }
            }
        });

        EventStream::new(event_rx)
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    /// Closes the connection.
    ///
    /// Fails every pending command with [`Error::ConnectionClosed`], stops the
    /// receive loop and releases the socket. Safe to call repeatedly and
    /// concurrently with in-flight commands.
    pub async fn close(&self) {
        if self.inner.finalize("closed by caller") {
            info!("Connection closed");
        }
        self.inner.release_writer().await;
    }
}

// ============================================================================
// Inner Implementation
// ============================================================================

impl Inner {
    /// Writes one text frame.
    async fn write(&self, json: String) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let Some(sink) = writer.as_mut() else {
            return Err(Error::ConnectionClosed);
        };

        sink.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Moves to `Closed`, failing pending commands and releasing the handler.
    ///
    /// Returns `true` if this call performed the transition.
    fn finalize(&self, reason: &'static str) -> bool {
        let (pending, handler) = {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.state == ConnectionState::Closed {
                return false;
            }
            lifecycle.state = ConnectionState::Closed;
            (
                mem::take(&mut lifecycle.pending),
                lifecycle.event_handler.take(),
            )
        };

        self.shutdown.send_replace(true);
        drop(handler);

        let count = pending.len();
        for (_, response_tx) in pending {
            let _ = response_tx.send(Err(Error::ConnectionClosed));
        }

        debug!(reason, failed_pending = count, "Connection finalized");
        true
    }

    /// Takes the write half and sends a close frame.
    async fn release_writer(&self) {
        let sink = self.writer.lock().await.take();
        if let Some(mut sink) = sink
            && let Err(e) = sink.close().await
        {
            trace!(error = %e, "Close frame not delivered");
        }
    }

    /// Reads the socket until it ends or the connection is closed.
    async fn run_receive_loop(
        inner: Arc<Self>,
        mut source: WsSource,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let _guard = FinalizeOnExit(Arc::clone(&inner));

        let reason = loop {
            tokio::select! {
                biased;

                // The watch::Ref must not outlive this branch.
                _ = async { let _ = shutdown_rx.wait_for(|closed| *closed).await; } => {
                    break "closed locally";
                }

                message = source.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            inner.handle_incoming_message(&text).await;
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break "closed by remote";
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket read error");
                            break "read error";
                        }

                        None => break "stream ended",

                        // Ignore Binary, Ping, Pong, Frame
                        _ => {}
                    }
                }
            }
        };

        inner.finalize(reason);
        inner.release_writer().await;

        debug!(reason, "Receive loop terminated");
    }

    /// Routes one inbound text message.
    async fn handle_incoming_message(&self, text: &str) {
        match Inbound::parse(text) {
            Ok(Inbound::Response(response)) => {
                let response_tx = self.lifecycle.lock().pending.remove(&response.id);

                match response_tx {
                    Some(response_tx) => {
                        trace!(id = %response.id, "Response received");
                        let _ = response_tx.send(Ok(response));
                    }
                    None => warn!(id = %response.id, "Response for unknown command discarded"),
                }
            }

            Ok(Inbound::Event(event)) => {
                let handler = {
                    let lifecycle = self.lifecycle.lock();
                    match lifecycle.state {
                        ConnectionState::Open => lifecycle.event_handler.clone(),
                        _ => None,
                    }
                };

                let Some(handler) = handler else {
                    trace!(method = %event.method, "Event without handler");
                    return;
                };

                let method = event.method.clone();
                let invocation = async move { handler(event).await };
                if AssertUnwindSafe(invocation).catch_unwind().await.is_err() {
                    error!(%method, "Event handler panicked");
                }
            }

            Err(e) => warn!(error = %e, text, "Failed to parse incoming message"),
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// FinalizeOnExit
// ============================================================================

/// Finalizes the connection when the receive loop ends, including by unwinding.
struct FinalizeOnExit(Arc<Inner>);

impl Drop for FinalizeOnExit {
    fn drop(&mut self) {
        if self.0.finalize("receive loop exited") {
            warn!("Receive loop exited without closing the connection");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
