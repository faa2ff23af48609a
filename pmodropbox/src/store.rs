//! Dropbox-backed picture store
//!
//! Implements the `PictureStore` capability consumed by the rotating picker.
//! A store handle embeds one access token; refreshing credentials builds a
//! brand-new handle from the persisted refresh token rather than mutating
//! the current one, so the picker can publish the replacement atomically.

use crate::auth::{self, AppCredentials, DEFAULT_OAUTH_BASE_URL};
use crate::client::{ClientBuilder, DropboxClient};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use pmopicsource::{PictureRef, PictureStore, SourceError};
use tracing::info;

/// A connected Dropbox folder serving as picture store.
pub struct DropboxStore {
    client: DropboxClient,
    builder: ClientBuilder,
    oauth_base_url: String,
    credentials: AppCredentials,
    folder: String,
}

impl DropboxStore {
    /// Refresh the access token and connect to the given folder.
    ///
    /// An empty folder means the app root folder.
    pub async fn connect(credentials: AppCredentials, folder: impl Into<String>) -> Result<Self> {
        Self::connect_with(
            ClientBuilder::new(),
            DEFAULT_OAUTH_BASE_URL,
            credentials,
            folder,
        )
        .await
    }

    /// Connect with a custom client builder and OAuth endpoint.
    ///
    /// The builder is kept on the store so a credential refresh rebuilds the
    /// client with the same settings (timeouts, base URL overrides).
    pub async fn connect_with(
        builder: ClientBuilder,
        oauth_base_url: &str,
        credentials: AppCredentials,
        folder: impl Into<String>,
    ) -> Result<Self> {
        let token =
            auth::refresh_offline_access_token(&builder.build_http()?, oauth_base_url, &credentials)
                .await?;
        let client = builder.build(token.access_token)?;

        info!("Connected to Dropbox");

        Ok(Self {
            client,
            builder,
            oauth_base_url: oauth_base_url.to_string(),
            credentials,
            folder: folder.into(),
        })
    }

    /// Folder this store rotates through
    pub fn folder(&self) -> &str {
        &self.folder
    }
}

#[async_trait]
impl PictureStore for DropboxStore {
    async fn list(&self) -> pmopicsource::Result<Vec<PictureRef>> {
        let entries = self
            .client
            .list_all_files(&self.folder)
            .await
            .map_err(|err| SourceError::store(err.to_string()))?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let path = entry.path_lower?;
                let id = entry.id.unwrap_or_else(|| path.clone());
                Some(PictureRef::new(id, path, entry.name))
            })
            .collect())
    }

    async fn fetch(&self, picture: &PictureRef) -> pmopicsource::Result<Bytes> {
        self.client
            .download(&picture.path)
            .await
            .map_err(|err| SourceError::store(err.to_string()))
    }

    async fn refresh_credentials(&self) -> pmopicsource::Result<Self> {
        Self::connect_with(
            self.builder.clone(),
            &self.oauth_base_url,
            self.credentials.clone(),
            self.folder.clone(),
        )
        .await
        .map_err(|err| SourceError::auth_refresh(err.to_string()))
    }
}
