//! WebSocket transport layer.
//!
//! This module owns the socket to one debug target and multiplexes
//! concurrent commands and the event stream over it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌──────────────────┐
//! │  Callers (Rust)  │                              │  Browser target  │
//! │                  │         WebSocket            │                  │
//! │  Connection      │◄────────────────────────────►│  DevTools        │
//! │  → receive loop  │   ws://HOST:PORT/devtools/.. │  endpoint        │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::new` - Idle, no socket
//! 2. `Connection::open` - Handshake, spawn receive loop
//! 3. `Connection::send` - Concurrent commands correlated by id
//! 4. `Connection::close` - Fail pending commands, release socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Connection state machine and receive loop |
//! | `subscription` | Channel-backed event stream |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and receive loop.
pub mod connection;

/// Event subscription stream.
pub mod subscription;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionState, EventHandler};
pub use subscription::EventStream;
