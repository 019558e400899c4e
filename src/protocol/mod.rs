//! WebSocket protocol message types.
//!
//! This module defines the message envelopes exchanged with the browser's
//! remote-debugging socket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Shape |
//! |--------------|-----------|-------|
//! | [`Request`] | Local → Remote | `{id, method, params?}` |
//! | [`Response`] | Remote → Local | `{id, result}` or `{id, error}` |
//! | [`Event`] | Remote → Local | `{method, params}` without `id` |
//!
//! An inbound message is a response if and only if it carries an `id`.

// ============================================================================
// Submodules
// ============================================================================

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::Event;
pub use request::{RemoteError, Request, Response};

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Inbound
// ============================================================================

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Reply to a command.
    Response(Response),
    /// Unsolicited notification.
    Event(Event),
}

impl Inbound {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not JSON or a field has the wrong type
    /// - [`Error::Protocol`] if the message is neither a response nor an event
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        if !value.is_object() {
            return Err(Error::protocol("inbound message is not an object"));
        }

        if value.get("id").is_some() {
            return Ok(Self::Response(serde_json::from_value(value)?));
        }

        if value.get("method").is_some() {
            return Ok(Self::Event(serde_json::from_value(value)?));
        }

        Err(Error::protocol("inbound message has neither id nor method"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::CommandId;

    #[test]
    fn test_parse_response() {
        let inbound = Inbound::parse(r#"{"id": 1, "result": {"x": 1}}"#).expect("parse");
        match inbound {
            Inbound::Response(response) => {
                assert_eq!(response.id, CommandId::new(1));
                assert_eq!(response.result, Some(json!({"x": 1})));
            }
            Inbound::Event(_) => panic!("expected response"),
        }
    }

    #[test]
    fn test_parse_error_response() {
        let inbound =
            Inbound::parse(r#"{"id": 9, "error": {"message": "nope"}}"#).expect("parse");
        assert!(matches!(inbound, Inbound::Response(r) if r.is_error()));
    }

    #[test]
    fn test_parse_event() {
        let inbound =
            Inbound::parse(r#"{"method": "Echo.ping", "params": {"n": 2}}"#).expect("parse");
        match inbound {
            Inbound::Event(event) => {
                assert_eq!(event.method, "Echo.ping");
                assert_eq!(event.params, json!({"n": 2}));
            }
            Inbound::Response(_) => panic!("expected event"),
        }
    }

    #[test]
    fn test_id_takes_precedence_over_method() {
        let inbound =
            Inbound::parse(r#"{"id": 3, "method": "X.y", "result": {}}"#).expect("parse");
        assert!(matches!(inbound, Inbound::Response(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_shapes() {
        assert!(Inbound::parse("not json").is_err());
        assert!(Inbound::parse("[1, 2]").is_err());
        assert!(Inbound::parse(r#"{"foo": "bar"}"#).is_err());
        assert!(Inbound::parse(r#"{"id": "abc", "result": {}}"#).is_err());
    }
}
