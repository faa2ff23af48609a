//! OAuth2 flows for Dropbox
//!
//! Two flows live here. The authorization-code exchange is the one-time
//! bootstrap: the user opens the authorization URL, approves the app and
//! pastes the displayed code back, which buys the long-lived refresh token.
//! The refresh grant is the steady-state flow, turning that refresh token
//! into a short-lived access token whenever the current one goes stale.

use crate::error::{DropboxError, Result};
use crate::models::OfflineAccessToken;
use reqwest::Client;
use tracing::{debug, info};

/// Base URL of the Dropbox OAuth2 token endpoint
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://api.dropbox.com";

/// Dropbox application credentials plus the user's refresh token.
///
/// Opaque to the rotation core; only this crate knows how to turn them into
/// an access token.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub refresh_token: String,
}

impl AppCredentials {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// URL where the user authorizes the app and obtains the one-time code for
/// [`exchange_authorization_code`]. Requests offline access so the response
/// includes a refresh token.
pub fn authorization_url(app_key: &str) -> String {
    format!(
        "https://www.dropbox.com/oauth2/authorize?client_id={app_key}&token_access_type=offline&response_type=code"
    )
}

/// Exchange a one-time authorization code for an offline access token.
///
/// The returned token carries the refresh token to persist in the
/// configuration; the access token itself expires within hours.
pub async fn exchange_authorization_code(
    http: &Client,
    oauth_base_url: &str,
    app_key: &str,
    app_secret: &str,
    code: &str,
) -> Result<OfflineAccessToken> {
    info!("Exchanging authorization code for an offline access token");
    let params = [("code", code), ("grant_type", "authorization_code")];
    token_request(http, oauth_base_url, app_key, app_secret, &params).await
}

/// Use a refresh token to obtain a fresh short-lived access token.
pub async fn refresh_offline_access_token(
    http: &Client,
    oauth_base_url: &str,
    credentials: &AppCredentials,
) -> Result<OfflineAccessToken> {
    debug!("Refreshing Dropbox access token");
    let params = [
        ("refresh_token", credentials.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    token_request(
        http,
        oauth_base_url,
        &credentials.app_key,
        &credentials.app_secret,
        &params,
    )
    .await
}

async fn token_request(
    http: &Client,
    oauth_base_url: &str,
    app_key: &str,
    app_secret: &str,
    params: &[(&str, &str)],
) -> Result<OfflineAccessToken> {
    let url = format!("{oauth_base_url}/oauth2/token");

    let response = http
        .post(&url)
        .basic_auth(app_key, Some(app_secret))
        .form(params)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(DropboxError::OAuth(format!(
            "token endpoint returned {status}: {text}"
        )));
    }

    serde_json::from_str(&text).map_err(DropboxError::Json)
}
