//! Dropbox client library for PMOFrame
//!
//! This crate provides a Rust client for the parts of the Dropbox API that
//! PMOFrame needs, and exposes a connected folder as a picture store the
//! rotation core can consume.
//!
//! # Features
//!
//! - **Folder Listing**: list every file of a folder, driving the
//!   `has_more`/cursor pagination automatically
//! - **Downloads**: fetch file bytes through the content endpoint
//! - **OAuth2**: refresh-token grant for steady-state operation, plus the
//!   one-time authorization-code bootstrap that obtains the refresh token
//! - **Picture Store**: `DropboxStore` implements
//!   `pmopicsource::PictureStore`, including wholesale credential refresh
//! - **Configuration Extension**: credentials, folder and shuffle seed kept
//!   in `pmoframeconfig`
//!
//! # Example
//!
//! ```no_run
//! use pmodropbox::{AppCredentials, DropboxStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = AppCredentials::new("app-key", "app-secret", "refresh-token");
//!     let store = DropboxStore::connect(credentials, "/frame").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Obtaining a refresh token
//!
//! Dropbox refresh tokens are issued once, through the authorization-code
//! flow:
//!
//! ```no_run
//! use pmodropbox::auth;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Open this URL, authorize the app and copy the displayed code
//! println!("{}", auth::authorization_url("app-key"));
//!
//! // 2. Exchange the code; persist `refresh_token` in the configuration
//! let http = reqwest::Client::new();
//! let token = auth::exchange_authorization_code(
//!     &http,
//!     auth::DEFAULT_OAUTH_BASE_URL,
//!     "app-key",
//!     "app-secret",
//!     "the-code",
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod store;

// Re-exports
pub use auth::{authorization_url, AppCredentials, DEFAULT_OAUTH_BASE_URL};
pub use client::{ClientBuilder, DropboxClient};
pub use config_ext::DropboxConfigExt;
pub use error::{DropboxError, Result};
pub use models::{ListEntry, ListFolderResult, OfflineAccessToken};
pub use store::DropboxStore;
