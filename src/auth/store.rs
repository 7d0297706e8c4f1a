//! Token acquisition with a local file cache

use super::token::Credential;
use crate::config::AuthSettings;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, HttpClient};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads the cached token, or requests and caches a fresh one
pub struct TokenStore {
    client: HttpClient,
    settings: AuthSettings,
}

impl TokenStore {
    pub fn new(client: HttpClient, settings: AuthSettings) -> Self {
        Self { client, settings }
    }

    /// Return a usable credential for this run.
    ///
    /// A valid cached token is returned without any network call. Otherwise a
    /// new one is requested and written back to the cache; a failed write is
    /// logged and ignored.
    pub async fn acquire(&self) -> Result<Credential> {
        if let Some(cred) = self.load_cached() {
            if cred.is_valid() {
                info!("Found cached valid token");
                return Ok(cred);
            }
            debug!("Cached token expired at {}", cred.expires);
        }

        let cred = self.request_new().await?;
        info!("Got new token, caching it");

        match self.cache(&cred) {
            Ok(()) => debug!("Token cached at {}", self.cache_path().display()),
            Err(e) => warn!(
                "Error saving token to file {}: {}",
                self.cache_path().display(),
                e
            ),
        }

        Ok(cred)
    }

    /// Read the cached credential as-is, without checking expiry.
    /// Anything unreadable counts as a cache miss.
    pub fn load_cached(&self) -> Option<Credential> {
        let path = self.cache_path();

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                debug!("No cached token at {}: {}", path.display(), e);
                return None;
            }
        };
        if !meta.is_file() {
            debug!("Token cache {} is not a file", path.display());
            return None;
        }

        let content = fs::read_to_string(path)
            .map_err(|e| debug!("Cannot read token cache {}: {}", path.display(), e))
            .ok()?;

        serde_json::from_str(&content)
            .map_err(|e| debug!("Corrupt token cache {}: {}", path.display(), e))
            .ok()
    }

    /// POST the client credentials to the authentication endpoint
    pub async fn request_new(&self) -> Result<Credential> {
        let url = format!("{}{}", self.settings.base_url(), self.settings.auth_endpoint);

        let request = ApiRequest::post(url)
            .form_field("version", self.settings.version.as_str())
            .form_field("client_id", self.settings.client_id.as_str())
            .form_field("client_secret", self.settings.client_secret.as_str());

        let response = self.client.execute(&request).await?;
        if !response.is_success() {
            return Err(Error::Auth {
                status: response.status,
                body: response.text,
            });
        }

        response.json()
    }

    /// Write the credential to the cache file, owner read/write only
    pub fn cache(&self, cred: &Credential) -> Result<()> {
        let path = self.cache_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true).truncate(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        serde_json::to_writer(&mut file, cred)?;
        file.write_all(b"\n")?;
        Ok(())
    }

    pub fn cache_path(&self) -> &Path {
        &self.settings.token_cache_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn store(dir: &Path) -> TokenStore {
        let settings = AuthSettings {
            hostname: "http://127.0.0.1:9".to_string(),
            token_cache_path: dir.join("cache").join("token.json"),
            ..Default::default()
        };
        TokenStore::new(HttpClient::new().unwrap(), settings)
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.load_cached().is_none());

        let cred = Credential::new("abc", Utc::now() + Duration::hours(1));
        store.cache(&cred).unwrap();
        assert_eq!(store.load_cached(), Some(cred));
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store
            .cache(&Credential::new("abc", Utc::now()))
            .unwrap();

        let mode = fs::metadata(store.cache_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_or_directory_cache_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        fs::create_dir_all(store.cache_path()).unwrap();
        assert!(store.load_cached().is_none());

        fs::remove_dir(store.cache_path()).unwrap();
        fs::write(store.cache_path(), "garbage").unwrap();
        assert!(store.load_cached().is_none());
    }
}
