//! Target resolution against the browser's metadata endpoint.
//!
//! Every call performs one fresh HTTP query. Nothing is cached or retried;
//! the target list can change between calls.
//!
//! # Example
//!
//! ```no_run
//! use chromectl::{DebuggerConfig, TargetResolver};
//!
//! # async fn example() -> chromectl::Result<()> {
//! let resolver = TargetResolver::new(DebuggerConfig::default())?;
//! for target in resolver.list_targets().await? {
//!     println!("{} {}", target.id, target.url);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::DebuggerConfig;
use crate::error::{Error, Result};
use crate::transport::Connection;

use super::target::TargetInfo;

// ============================================================================
// TargetResolver
// ============================================================================

/// Maps target identifiers to connectable socket addresses.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    config: DebuggerConfig,
    client: Client,
}

impl TargetResolver {
    /// Creates a resolver for the given debugger endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryUnavailable`] if the HTTP client cannot be built.
    pub fn new(config: DebuggerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.discovery_timeout)
            .build()
            .map_err(|e| Error::discovery_unavailable(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Returns the endpoint configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    /// Lists every target the browser currently exposes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryUnavailable`] on transport failure,
    /// non-success status or an undecodable body.
    pub async fn list_targets(&self) -> Result<Vec<TargetInfo>> {
        let url = self.config.list_url();
        let targets: Vec<TargetInfo> = self.fetch(self.client.get(&url)).await?;

        debug!(%url, count = targets.len(), "Listed targets");
        Ok(targets)
    }

    /// Resolves a target identifier to its WebSocket debugger URL.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `identifier` is empty
    /// - [`Error::DiscoveryUnavailable`] if the metadata query fails
    /// - [`Error::TargetNotFound`] if no connectable target has that id
    pub async fn resolve(&self, identifier: &str) -> Result<String> {
        if identifier.is_empty() {
            return Err(Error::invalid_argument("target identifier must not be empty"));
        }

        let targets = self.list_targets().await?;
        find_debugger_url(&targets, identifier)
    }

    /// Opens a new tab at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryUnavailable`] if the request fails.
    pub async fn new_tab(&self, url: &str) -> Result<TargetInfo> {
        let endpoint = self.config.new_tab_url(url);
        let target: TargetInfo = self.fetch(self.client.put(&endpoint)).await?;

        debug!(id = %target.id, url = %target.url, "Opened new tab");
        Ok(target)
    }

    /// Resolves `identifier` and opens a [`Connection`] to it.
    ///
    /// # Errors
    ///
    /// As [`resolve`](Self::resolve) and [`Connection::open`].
    pub async fn attach(&self, identifier: &str) -> Result<Connection> {
        let ws_url = self.resolve(identifier).await?;
        Connection::connect(&ws_url).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::discovery_unavailable(e.to_string()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| Error::discovery_unavailable(format!("malformed payload: {e}")))
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Finds the debugger URL of the target with the given id.
///
/// A matching target without a socket address is not connectable and
/// counts as not found.
fn find_debugger_url(targets: &[TargetInfo], identifier: &str) -> Result<String> {
    let target = targets
        .iter()
        .find(|target| target.id.as_str() == identifier)
        .ok_or_else(|| Error::target_not_found(identifier))?;

    match &target.web_socket_debugger_url {
        Some(url) => Ok(url.clone()),
        None => {
            debug!(id = identifier, "Target has no debugger URL");
            Err(Error::target_not_found(identifier))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
