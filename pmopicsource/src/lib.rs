//! # PMOPicSource
//!
//! Common traits and types for PMOFrame picture sources.
//!
//! This crate provides the foundational abstractions for serving a rotating
//! sequence of pictures from a remote store, plus the two components that make
//! the rotation cheap to serve:
//!
//! - **`PictureStore`**: capability implemented by remote backends
//!   (list a folder, fetch one picture, refresh the credential).
//! - **`RotatingPicker`**: walks the listing in shuffled order, reshuffles on
//!   wraparound, and retries a failed fetch once after refreshing the
//!   store credential.
//! - **`Flipper`**: a time-windowed double-buffered cache in front of any
//!   `PictureSource`, so HTTP requests never block on the network.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pmopicsource::{Flipper, RotatingPicker, ShufflePolicy};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo(store: impl pmopicsource::PictureStore + 'static) -> pmopicsource::Result<()> {
//! let picker = RotatingPicker::new(store, ShufflePolicy::TimeSeeded).await?;
//! let flipper = Flipper::new(Arc::new(picker), Duration::from_secs(9)).await?;
//!
//! // Never blocks on the network once constructed
//! let picture = flipper.next();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flipper;
pub mod picker;

use async_trait::async_trait;
use bytes::Bytes;

// Re-exports
pub use error::{Result, SourceError};
pub use flipper::Flipper;
pub use picker::{RotatingPicker, ShufflePolicy};

/// Reference to one remote picture, as returned by a store listing.
///
/// Immutable once listed; the rotation only ever reorders the collection,
/// it never edits an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRef {
    /// Stable identifier assigned by the remote store
    pub id: String,
    /// Path used to fetch the picture bytes
    pub path: String,
    /// Display name (file name)
    pub name: String,
}

impl PictureRef {
    pub fn new(id: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            name: name.into(),
        }
    }
}

/// Capability consumed by [`RotatingPicker`]: a remote store of pictures.
///
/// `refresh_credentials` returns a brand-new handle rather than mutating the
/// current one; the picker publishes the new handle so every subsequent fetch
/// uses the refreshed credential.
#[async_trait]
pub trait PictureStore: Send + Sync + Sized {
    /// List every picture in the collection.
    async fn list(&self) -> Result<Vec<PictureRef>>;

    /// Fetch the bytes of one picture.
    async fn fetch(&self, picture: &PictureRef) -> Result<Bytes>;

    /// Obtain a new store handle with a freshly refreshed credential.
    ///
    /// Implementations map a failed refresh to [`SourceError::AuthRefresh`].
    async fn refresh_credentials(&self) -> Result<Self>;
}

/// Capability consumed by [`Flipper`]: anything that can produce the "next"
/// picture. Implemented by [`RotatingPicker`], and by [`Flipper`] itself so
/// the assembled stack exposes the same interface it consumes.
#[async_trait]
pub trait PictureSource: Send + Sync {
    /// Return the bytes of the next picture in the rotation.
    async fn next_picture(&self) -> Result<Bytes>;
}
