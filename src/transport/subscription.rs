//! Channel-backed event subscription.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use crate::protocol::Event;

// ============================================================================
// EventStream
// ============================================================================

/// Live stream of events from one connection.
///
/// Created by [`Connection::subscribe`](super::Connection::subscribe).
/// Yields events in socket arrival order and ends once the subscription is
/// replaced, cleared, or the connection closes.
#[derive(Debug)]
pub struct EventStream {
    event_rx: mpsc::Receiver<Event>,
}

impl EventStream {
    pub(crate) fn new(event_rx: mpsc::Receiver<Event>) -> Self {
        Self { event_rx }
    }

    /// Receives the next event, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Stops accepting events. Already buffered events can still be received.
    pub fn close(&mut self) {
        self.event_rx.close();
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.get_mut().event_rx.poll_recv(cx)
    }
}

// ============================================================================
// Tests
// ============================================================================
