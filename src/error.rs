//! Error types for chromectl.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chromectl::{Connection, Result};
//!
//! async fn example(conn: &Connection) -> Result<()> {
//!     conn.send("Runtime.enable", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Discovery | [`Error::TargetNotFound`], [`Error::DiscoveryUnavailable`] |
//! | Connection | [`Error::Transport`], [`Error::ConnectionClosed`], [`Error::InvalidState`], [`Error::Protocol`] |
//! | Command | [`Error::RemoteCommand`], [`Error::RequestTimeout`] |
//! | Usage | [`Error::InvalidArgument`] |
//! | External | [`Error::Json`], [`Error::Url`] |
//!
//! `tungstenite::Error` converts into [`Error::Transport`].

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::identifiers::{CommandId, TargetId};
use crate::protocol::RemoteError;
use crate::transport::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// No listed target matches the identifier.
    ///
    /// The target list may have changed; re-list and retry.
    #[error("Target not found: {target_id}")]
    TargetNotFound {
        /// The identifier that failed to resolve.
        target_id: TargetId,
    },

    /// The metadata endpoint could not be queried or decoded.
    #[error("Discovery unavailable: {message}")]
    DiscoveryUnavailable {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Socket-level send or receive failure.
    ///
    /// Fatal to the connection it occurred on.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The connection closed while the command was pending, or before it was sent.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Operation not valid in the connection's current lifecycle state.
    #[error("Cannot {operation} while connection is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// State the connection was in.
        state: ConnectionState,
    },

    /// Inbound message has an unrecognized shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// The remote endpoint rejected or failed a command.
    ///
    /// Specific to one command; other pending commands are unaffected.
    #[error("{method} failed: {error}")]
    RemoteCommand {
        /// Method of the failed command.
        method: String,
        /// Error payload returned by the remote end.
        error: RemoteError,
    },

    /// Caller-side deadline elapsed before the response arrived.
    #[error("Command {command_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The command that timed out.
        command_id: CommandId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a target not found error.
    #[inline]
    pub fn target_not_found(target_id: impl Into<TargetId>) -> Self {
        Self::TargetNotFound {
            target_id: target_id.into(),
        }
    }

    /// Creates a discovery unavailable error.
    #[inline]
    pub fn discovery_unavailable(message: impl Into<String>) -> Self {
        Self::DiscoveryUnavailable {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an invalid state error.
    #[inline]
    pub fn invalid_state(operation: &'static str, state: ConnectionState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a remote command error.
    #[inline]
    pub fn remote_command(method: impl Into<String>, error: RemoteError) -> Self {
        Self::RemoteCommand {
            method: method.into(),
            error,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(command_id: CommandId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            command_id,
            timeout_ms,
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<tungstenite::Error> for Error {
    /// Socket failures are all fatal to the connection, so they collapse into
    /// [`Error::Transport`].
    fn from(err: tungstenite::Error) -> Self {
        Self::transport(err.to_string())
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ConnectionClosed)
    }

    /// Returns `true` if the remote end rejected the command.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteCommand { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors leave the connection usable, or may succeed
    /// after re-listing targets.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound { .. }
                | Self::DiscoveryUnavailable { .. }
                | Self::RemoteCommand { .. }
                | Self::RequestTimeout { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
