//! Request and Response message types.
//!
//! Defines the envelope for command requests and their correlated
//! responses.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

// ============================================================================
// Request
// ============================================================================

/// A command request from local end to remote end.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.methodName",
///   "params": { ... }
/// }
/// ```
///
/// `params` is omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Identifier for request/response correlation.
    pub id: CommandId,

    /// Command name in `Domain.methodName` format.
    pub method: String,

    /// Command parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(id: CommandId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from remote end to local end.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32601, "message": "..." } }
/// ```
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: CommandId,

    /// Result payload (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if error).
    #[serde(default)]
    pub error: Option<Value>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// A response carrying neither field yields an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCommand`] if the response carries an error.
    pub fn into_result(self, method: &str) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::remote_command(method, RemoteError::from_value(error))),
            None => Ok(self.result.unwrap_or_else(|| Value::Object(Map::new()))),
        }
    }
}

// ============================================================================
// RemoteError
// ============================================================================

/// Error payload reported by the remote end for a failed command.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    /// Numeric error code, when supplied.
    pub code: Option<i64>,

    /// Human-readable message.
    pub message: String,

    /// Extra detail, when supplied.
    pub data: Option<Value>,

    /// The payload as received.
    pub raw: Value,
}

impl RemoteError {
    /// Builds a [`RemoteError`] from whatever shape the remote end sent.
    ///
    /// Objects contribute `code`, `message` and `data`; any other value
    /// becomes the message text.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let code = raw.get("code").and_then(Value::as_i64);
        let data = raw.get("data").cloned();
        let message = match &raw {
            Value::String(text) => text.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| raw.to_string(), str::to_string),
            other => other.to_string(),
        };

        Self {
            code,
            message,
            data,
            raw,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
