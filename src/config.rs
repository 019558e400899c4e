//! Debugger endpoint configuration.
//!
//! The browser exposes its remote-debugging HTTP and WebSocket endpoints on
//! one host and port. [`DebuggerConfig`] carries that address explicitly so
//! nothing depends on process-wide defaults.
//!
//! # Example
//!
//! ```
//! use chromectl::DebuggerConfig;
//!
//! let config = DebuggerConfig::new().with_port(9333);
//! assert_eq!(config.list_url(), "http://127.0.0.1:9333/json");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default debugger host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default remote-debugging port.
pub const DEFAULT_PORT: u16 = 9222;

/// Default deadline for one metadata query.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// DebuggerConfig
// ============================================================================

/// Address of a browser's remote-debugging endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerConfig {
    /// Host the browser listens on.
    pub host: String,

    /// Remote-debugging port.
    pub port: u16,

    /// Deadline for one metadata query. Expiry is reported as
    /// [`Error::DiscoveryUnavailable`](crate::Error::DiscoveryUnavailable).
    pub discovery_timeout: Duration,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl DebuggerConfig {
    /// Creates a config pointing at `127.0.0.1:9222`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DebuggerConfig {
    /// Sets the host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the metadata query deadline.
    #[inline]
    #[must_use]
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }
}

// ============================================================================
// Endpoint URLs
// ============================================================================

impl DebuggerConfig {
    /// Returns `http://{host}:{port}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Returns the target listing URL.
    #[must_use]
    pub fn list_url(&self) -> String {
        format!("{}/json", self.base_url())
    }

    /// Returns the URL that opens a new tab at `url`.
    ///
    /// The browser takes the page URL verbatim as the query string.
    #[must_use]
    pub fn new_tab_url(&self, url: &str) -> String {
        format!("{}/json/new?{}", self.base_url(), url)
    }
}

// ============================================================================
// Tests
// ============================================================================
