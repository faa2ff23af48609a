//! Error types for picture source operations

/// Result type alias for picture source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while listing, fetching or rotating pictures
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The remote listing succeeded but contained no usable picture.
    /// Fatal at construction: a picker cannot rotate over nothing.
    #[error("picture listing returned no usable entries")]
    EmptyCollection,

    /// Listing or fetch failed for a reason other than authentication
    #[error("store error: {0}")]
    Store(String),

    /// The credential refresh itself failed; not retried further
    #[error("credential refresh failed: {0}")]
    AuthRefresh(String),

    /// Fetch failed even after one credential refresh and retry
    #[error("fetch failed after credential refresh: {0}")]
    Fetch(String),
}

impl SourceError {
    /// Create a store error from any displayable cause
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a credential refresh error
    pub fn auth_refresh(msg: impl Into<String>) -> Self {
        Self::AuthRefresh(msg.into())
    }

    /// Create a post-retry fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }
}
