//! Extension pour intégrer la configuration Dropbox dans pmoframeconfig
//!
//! This module provides the `DropboxConfigExt` trait which adds Dropbox
//! credential and rotation settings to `pmoframeconfig::Config`.

use crate::auth::AppCredentials;
use anyhow::{anyhow, Result};
use pmoframeconfig::Config;
use serde_yaml::{Number, Value};

/// Extension trait for Dropbox settings in pmoframeconfig
///
/// # Example
///
/// ```rust,ignore
/// use pmoframeconfig::get_config;
/// use pmodropbox::DropboxConfigExt;
///
/// let config = get_config();
/// let credentials = config.get_dropbox_credentials()?;
/// ```
pub trait DropboxConfigExt {
    /// App key of the registered Dropbox application
    fn get_dropbox_app_key(&self) -> Result<String>;
    fn set_dropbox_app_key(&self, app_key: &str) -> Result<()>;

    /// App secret of the registered Dropbox application
    fn get_dropbox_app_secret(&self) -> Result<String>;
    fn set_dropbox_app_secret(&self, app_secret: &str) -> Result<()>;

    /// Long-lived user refresh token obtained through the one-time
    /// authorization-code exchange
    fn get_dropbox_refresh_token(&self) -> Result<String>;
    fn set_dropbox_refresh_token(&self, refresh_token: &str) -> Result<()>;

    /// All three credential values bundled for `DropboxStore::connect`
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing value.
    fn get_dropbox_credentials(&self) -> Result<AppCredentials>;

    /// Folder to rotate through; empty means the app root folder
    fn get_dropbox_folder(&self) -> Result<String>;
    fn set_dropbox_folder(&self, folder: &str) -> Result<()>;

    /// Signed shuffle seed: 0 time-seeded, negative disabled, positive literal
    fn get_dropbox_shuffle_seed(&self) -> Result<i64>;
    fn set_dropbox_shuffle_seed(&self, seed: i64) -> Result<()>;
}

fn get_required_string(config: &Config, key: &str) -> Result<String> {
    match config.get_value(&["dropbox", key]) {
        Ok(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(anyhow!("Dropbox {} not configured", key.replace('_', " "))),
    }
}

impl DropboxConfigExt for Config {
    fn get_dropbox_app_key(&self) -> Result<String> {
        get_required_string(self, "app_key")
    }

    fn set_dropbox_app_key(&self, app_key: &str) -> Result<()> {
        self.set_value(&["dropbox", "app_key"], Value::String(app_key.to_string()))
    }

    fn get_dropbox_app_secret(&self) -> Result<String> {
        get_required_string(self, "app_secret")
    }

    fn set_dropbox_app_secret(&self, app_secret: &str) -> Result<()> {
        self.set_value(
            &["dropbox", "app_secret"],
            Value::String(app_secret.to_string()),
        )
    }

    fn get_dropbox_refresh_token(&self) -> Result<String> {
        get_required_string(self, "refresh_token")
    }

    fn set_dropbox_refresh_token(&self, refresh_token: &str) -> Result<()> {
        self.set_value(
            &["dropbox", "refresh_token"],
            Value::String(refresh_token.to_string()),
        )
    }

    fn get_dropbox_credentials(&self) -> Result<AppCredentials> {
        Ok(AppCredentials::new(
            self.get_dropbox_app_key()?,
            self.get_dropbox_app_secret()?,
            self.get_dropbox_refresh_token()?,
        ))
    }

    fn get_dropbox_folder(&self) -> Result<String> {
        match self.get_value(&["dropbox", "folder"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(String::new()),
        }
    }

    fn set_dropbox_folder(&self, folder: &str) -> Result<()> {
        self.set_value(&["dropbox", "folder"], Value::String(folder.to_string()))
    }

    fn get_dropbox_shuffle_seed(&self) -> Result<i64> {
        match self.get_value(&["dropbox", "shuffle_seed"]) {
            Ok(Value::Number(n)) if n.is_i64() => Ok(n.as_i64().unwrap()),
            _ => Ok(0),
        }
    }

    fn set_dropbox_shuffle_seed(&self, seed: i64) -> Result<()> {
        self.set_value(
            &["dropbox", "shuffle_seed"],
            Value::Number(Number::from(seed)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_credentials_roundtrip() {
        let (_dir, config) = test_config();

        config.set_dropbox_app_key("key").unwrap();
        config.set_dropbox_app_secret("secret").unwrap();
        config.set_dropbox_refresh_token("refresh").unwrap();

        let credentials = config.get_dropbox_credentials().unwrap();
        assert_eq!(credentials.app_key, "key");
        assert_eq!(credentials.app_secret, "secret");
        assert_eq!(credentials.refresh_token, "refresh");
    }

    #[test]
    fn test_missing_credentials_error() {
        let (_dir, config) = test_config();
        // Default config ships empty strings, which count as unconfigured
        assert!(config.get_dropbox_credentials().is_err());
    }

    #[test]
    fn test_folder_and_seed_defaults() {
        let (_dir, config) = test_config();
        assert_eq!(config.get_dropbox_folder().unwrap(), "");
        assert_eq!(config.get_dropbox_shuffle_seed().unwrap(), 0);

        config.set_dropbox_folder("/frame").unwrap();
        config.set_dropbox_shuffle_seed(-1).unwrap();
        assert_eq!(config.get_dropbox_folder().unwrap(), "/frame");
        assert_eq!(config.get_dropbox_shuffle_seed().unwrap(), -1);
    }
}
