//! Target descriptors returned by the metadata endpoint.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::TargetId;

// ============================================================================
// TargetInfo
// ============================================================================

/// One debuggable target as listed by `GET /json`.
///
/// # Format
///
/// ```json
/// {
///   "id": "E3A1...",
///   "type": "page",
///   "title": "Example Domain",
///   "url": "https://example.com/",
///   "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/E3A1..."
/// }
/// ```
///
/// Only `id` is required; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    /// Target identifier.
    pub id: TargetId,

    /// Target kind (`page`, `iframe`, `service_worker`, ...).
    #[serde(rename = "type", default)]
    pub target_type: String,

    /// Page title.
    #[serde(default)]
    pub title: String,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Whether a client is already attached, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached: Option<bool>,

    /// Socket address for a protocol connection. Absent while another
    /// client holds an exclusive attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_socket_debugger_url: Option<String>,

    /// DevTools frontend URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtools_frontend_url: Option<String>,
}

impl TargetInfo {
    /// Returns `true` for page targets (tabs).
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

// ============================================================================
// Tests
// ============================================================================
