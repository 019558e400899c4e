//! chromectl - Chrome DevTools Protocol connection layer.
//!
//! This library connects to a browser's remote-debugging endpoint and
//! multiplexes numbered commands and live events over one WebSocket.
//!
//! # Architecture
//!
//! The crate follows a client model against an already running browser:
//!
//! - **Discovery (HTTP)**: Lists targets and resolves a target id to its
//!   WebSocket debugger URL
//! - **Connection (WebSocket)**: Sends commands, correlates responses by id,
//!   delivers events to a single handler in arrival order
//!
//! Key design principles:
//!
//! - Each [`Connection`] owns: one socket + one receive loop + pending map
//! - Protocol uses `Domain.methodName` format
//! - Closing fails every pending command; nothing waits forever
//! - Addresses are explicit configuration ([`DebuggerConfig`]), never globals
//!
//! # Quick Start
//!
//! ```no_run
//! use chromectl::{DebuggerConfig, Result, TargetResolver};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let resolver = TargetResolver::new(DebuggerConfig::default())?;
//!     let connection = resolver.attach("E3A1B2C4").await?;
//!
//!     connection.set_event_handler(|event| async move {
//!         println!("{} {}", event.method, event.params);
//!     });
//!
//!     connection.send("Runtime.enable", None).await?;
//!     let result = connection
//!         .send("Runtime.evaluate", Some(json!({"expression": "1 + 1"})))
//!         .await?;
//!     println!("{result}");
//!
//!     connection.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Debugger endpoint address |
//! | [`discovery`] | Target listing and resolution |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | WebSocket message types |
//! | [`transport`] | Connection and receive loop |

// ============================================================================
// Modules
// ============================================================================

/// Debugger endpoint configuration.
pub mod config;

/// Target discovery over HTTP.
///
/// Use [`TargetResolver`] to list targets and resolve their socket addresses.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// WebSocket protocol message types.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::DebuggerConfig;

// Discovery types
pub use discovery::{TargetInfo, TargetResolver};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, TargetId};

// Protocol types
pub use protocol::{Event, RemoteError};

// Transport types
pub use transport::{Connection, ConnectionState, EventHandler, EventStream};
