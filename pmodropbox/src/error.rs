//! Error types for the Dropbox client

use thiserror::Error;

/// Result type alias for pmodropbox operations
pub type Result<T> = std::result::Result<T, DropboxError>;

/// Errors that can occur when talking to Dropbox
#[derive(Error, Debug)]
pub enum DropboxError {
    /// Authentication failed (stale or invalid access token)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// OAuth token exchange or refresh failed
    #[error("OAuth token exchange failed: {0}")]
    OAuth(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the Dropbox API
    #[error("Dropbox API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Quota exceeded (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// Configuration error (from pmoframeconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl DropboxError {
    /// Create an API error from an HTTP status code and a message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }

    /// Check whether the error points at a stale or broken credential
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::OAuth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            DropboxError::from_status(401, "expired"),
            DropboxError::Unauthorized(_)
        ));
        assert!(matches!(
            DropboxError::from_status(403, "forbidden"),
            DropboxError::Unauthorized(_)
        ));
        assert!(matches!(
            DropboxError::from_status(429, "slow down"),
            DropboxError::RateLimitExceeded
        ));
        assert!(matches!(
            DropboxError::from_status(409, "path not found"),
            DropboxError::Api { status: 409, .. }
        ));
    }

    #[test]
    fn test_is_auth_error() {
        assert!(DropboxError::from_status(401, "expired").is_auth_error());
        assert!(DropboxError::OAuth("bad refresh token".into()).is_auth_error());
        assert!(!DropboxError::from_status(500, "boom").is_auth_error());
    }
}
