//! Low-level HTTP client for the Dropbox API
//!
//! Listing goes through the RPC endpoint (`api.dropboxapi.com`), downloads
//! through the content endpoint (`content.dropboxapi.com`) with the argument
//! JSON carried in the `Dropbox-API-Arg` header. Both base URLs can be
//! overridden through the builder, which is how the tests point the client
//! at a local mock server.

use crate::error::{DropboxError, Result};
use crate::models::{ListEntry, ListFolderResult};
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default base URL of the Dropbox RPC API
pub const DEFAULT_API_BASE_URL: &str = "https://api.dropboxapi.com";

/// Default base URL of the Dropbox content API
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://content.dropboxapi.com";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PMOFrame/0.1 (pmodropbox)";

/// Page size for folder listings; larger folders are paginated
const LIST_FOLDER_LIMIT: u32 = 250;

/// Dropbox HTTP client bound to one access token.
///
/// The client is stateless apart from the token: it never caches listings or
/// downloads, higher layers own that. A stale token is not refreshed here —
/// the store builds a whole new client instead.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    http: Client,
    api_base_url: String,
    content_base_url: String,
    access_token: String,
}

impl DropboxClient {
    /// Create a client with default settings for the given access token
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().build(access_token)
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// List one page of a folder. An empty path means the app root folder.
    pub async fn list_folder(&self, path: &str) -> Result<ListFolderResult> {
        self.rpc(
            "/2/files/list_folder",
            serde_json::json!({ "path": path, "limit": LIST_FOLDER_LIMIT }),
        )
        .await
    }

    /// Fetch the next page of a listing started with [`list_folder`](Self::list_folder)
    pub async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult> {
        self.rpc(
            "/2/files/list_folder/continue",
            serde_json::json!({ "cursor": cursor }),
        )
        .await
    }

    /// List every file of a folder, driving the pagination loop.
    ///
    /// Folder and deleted entries are dropped; depending on the folder size
    /// this may issue several requests.
    pub async fn list_all_files(&self, path: &str) -> Result<Vec<ListEntry>> {
        let mut result = self.list_folder(path).await?;
        let mut entries: Vec<ListEntry> = Vec::new();

        loop {
            entries.extend(result.entries.into_iter().filter(ListEntry::is_file));

            if !result.has_more {
                break;
            }
            result = self.list_folder_continue(&result.cursor).await?;
        }

        debug!(path, count = entries.len(), "listed folder files");
        Ok(entries)
    }

    /// Download one file and return its bytes
    pub async fn download(&self, path: &str) -> Result<Bytes> {
        let url = format!("{}/2/files/download", self.content_base_url);
        let arg = serde_json::json!({ "path": path }).to_string();

        debug!(path, "downloading file");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", arg)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), "download failed: {}", text);
            return Err(DropboxError::from_status(status.as_u16(), text));
        }

        Ok(response.bytes().await?)
    }

    /// Perform one RPC call against the API endpoint
    async fn rpc<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}{}", self.api_base_url, endpoint);

        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("API error ({}): {}", status.as_u16(), text);
            return Err(DropboxError::from_status(status.as_u16(), text));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            DropboxError::Json(e)
        })
    }
}

/// Builder for [`DropboxClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_base_url: String,
    content_base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            content_base_url: DEFAULT_CONTENT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the RPC API base URL (tests)
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the content base URL (tests)
    pub fn content_base_url(mut self, url: impl Into<String>) -> Self {
        self.content_base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the underlying HTTP client, without binding an access token.
    /// Used for the OAuth calls that happen before a token exists.
    pub fn build_http(&self) -> Result<Client> {
        Ok(Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?)
    }

    /// Build a [`DropboxClient`] bound to the given access token
    pub fn build(&self, access_token: impl Into<String>) -> Result<DropboxClient> {
        Ok(DropboxClient {
            http: self.build_http()?,
            api_base_url: self.api_base_url.clone(),
            content_base_url: self.content_base_url.clone(),
            access_token: access_token.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = DropboxClient::new("token").unwrap();
        assert_eq!(client.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(client.content_base_url, DEFAULT_CONTENT_BASE_URL);
    }

    #[test]
    fn test_builder_overrides() {
        let client = DropboxClient::builder()
            .api_base_url("http://localhost:1234")
            .content_base_url("http://localhost:5678")
            .timeout(Duration::from_secs(5))
            .build("token")
            .unwrap();
        assert_eq!(client.api_base_url, "http://localhost:1234");
        assert_eq!(client.content_base_url, "http://localhost:5678");
    }
}
