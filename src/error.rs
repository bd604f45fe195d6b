//! Error types for constrained tessellation
//!
//! Geometric failures (short rings, disjoint operands, collapsed cells) are
//! not errors: the clipper and the session absorb them per cell. Only caller
//! mistakes surface here.

use thiserror::Error;

use crate::cell::SiteId;

/// Errors that can occur while configuring or driving a session
#[derive(Debug, Error)]
pub enum TessellationError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A command referenced a site that is not in the working set
    #[error("site not found: {0}")]
    SiteNotFound(SiteId),
    /// A boundary document could not be parsed
    #[cfg(feature = "serde")]
    #[error("malformed boundary document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tessellation operations
pub type Result<T> = std::result::Result<T, TessellationError>;
