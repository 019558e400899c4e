//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing command IDs with other integers and
//! target IDs with arbitrary strings.
//!
//! | Type | Wire Format | Source |
//! |------|-------------|--------|
//! | [`CommandId`] | integer | Allocated per connection, starts at 1 |
//! | [`TargetId`] | string | Assigned by the browser |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// CommandId
// ============================================================================

/// Identifier correlating a command request with its response.
///
/// Unique and monotonically increasing within one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    /// Wraps a raw command ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CommandIdSequence
// ============================================================================

/// Per-connection allocator of sequential [`CommandId`]s.
#[derive(Debug)]
pub(crate) struct CommandIdSequence {
    next: AtomicU64,
}

impl CommandIdSequence {
    /// Creates a sequence whose first ID is 1.
    pub(crate) const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocates the next ID.
    pub(crate) fn next(&self) -> CommandId {
        CommandId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CommandIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TargetId
// ============================================================================

/// Opaque identifier of a debuggable target (tab, worker, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Wraps a target identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let seq = CommandIdSequence::new();
        assert_eq!(seq.next(), CommandId::new(1));
        assert_eq!(seq.next(), CommandId::new(2));
        assert_eq!(seq.next(), CommandId::new(3));
    }

    #[test]
    fn test_command_id_serializes_as_integer() {
        let json = serde_json::to_string(&CommandId::new(7)).expect("serialize");
        assert_eq!(json, "7");
    }

    #[test]
    fn test_target_id_display() {
        let id = TargetId::from("E3A1");
        assert_eq!(id.to_string(), "E3A1");
        assert_eq!(id.as_str(), "E3A1");
    }
}
