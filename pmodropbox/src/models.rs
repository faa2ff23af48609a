//! Wire models for the Dropbox API responses

use serde::{Deserialize, Serialize};

/// One entry of a folder listing.
///
/// Dropbox tags every entry with its kind (`file`, `folder`, `deleted`);
/// the picture store only ever keeps `file` entries.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEntry {
    /// Entry kind reported by Dropbox
    #[serde(rename = ".tag")]
    pub tag: String,
    /// File or folder name
    pub name: String,
    /// Stable Dropbox identifier (absent on deleted entries)
    #[serde(default)]
    pub id: Option<String>,
    /// Lowercased full path, used for downloads
    #[serde(default)]
    pub path_lower: Option<String>,
    /// File size in bytes (files only)
    #[serde(default)]
    pub size: Option<u64>,
}

impl ListEntry {
    /// Whether this entry is a downloadable file
    pub fn is_file(&self) -> bool {
        self.tag == "file"
    }
}

/// One page of a folder listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<ListEntry>,
    /// Opaque cursor for `list_folder_continue`
    pub cursor: String,
    /// Whether another page must be fetched with the cursor
    pub has_more: bool,
}

/// A user offline access token: a short-lived access token plus, on the
/// initial authorization-code exchange, the long-lived refresh token used to
/// obtain fresh access tokens later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineAccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: u64,
    /// Only present on the authorization-code exchange
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}
