//! Target discovery over the browser's HTTP metadata endpoint.
//!
//! | Endpoint | Method | Used by |
//! |----------|--------|---------|
//! | `/json` | `GET` | [`TargetResolver::list_targets`], [`TargetResolver::resolve`] |
//! | `/json/new?<url>` | `PUT` | [`TargetResolver::new_tab`] |

// ============================================================================
// Submodules
// ============================================================================

/// Target identifier resolution.
pub mod resolver;

/// Target descriptor type.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use resolver::TargetResolver;
pub use target::TargetInfo;
