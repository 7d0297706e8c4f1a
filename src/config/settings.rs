//! Settings structures for the client configuration file

use crate::error::{Error, Result};
use crate::search::SearchDefinition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main settings structure, matching the layout of `config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Credentials and endpoints, kept at the top level of the file
    #[serde(flatten)]
    pub auth: AuthSettings,
    /// Number of searches run concurrently
    pub workers: usize,
    /// Number of records requested per page
    pub page_size: u64,
    /// Enable debug logging
    pub debug: bool,
    pub outgoing: OutgoingSettings,
    pub retry: RetrySettings,
    pub searches: Vec<SearchDefinition>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth: AuthSettings::default(),
            workers: crate::DEFAULT_WORKERS,
            page_size: 1000,
            debug: false,
            outgoing: OutgoingSettings::default(),
            retry: RetrySettings::default(),
            searches: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON or YAML file, picked by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(Error::Config(format!(
                "config file {} is not a regular file",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(&content)?),
            _ => serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string())),
        }
    }

    /// Merge with environment variables (THINKNUM_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("THINKNUM_HOSTNAME") {
            self.auth.hostname = val;
        }
        if let Ok(val) = std::env::var("THINKNUM_CLIENT_ID") {
            self.auth.client_id = val;
        }
        if let Ok(val) = std::env::var("THINKNUM_CLIENT_SECRET") {
            self.auth.client_secret = val;
        }
        if let Ok(val) = std::env::var("THINKNUM_TOKEN_CACHE") {
            self.auth.token_cache_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("THINKNUM_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.workers = workers;
            }
        }
        if let Ok(val) = std::env::var("THINKNUM_PAGE_SIZE") {
            if let Ok(size) = val.parse() {
                self.page_size = size;
            }
        }
        if let Ok(val) = std::env::var("THINKNUM_DEBUG") {
            match parse_flag(&val) {
                Some(debug) => self.debug = debug,
                None => tracing::warn!("Ignoring THINKNUM_DEBUG={:?}, expected a boolean", val),
            }
        }
    }

    /// Check the settings before any network call is made
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Validation("workers must be at least 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Validation("page_size must be at least 1".to_string()));
        }
        if self.auth.hostname.trim().is_empty() {
            return Err(Error::Validation("hostname is not set".to_string()));
        }
        let timeout = self.outgoing.request_timeout;
        if !(timeout.is_finite() && timeout > 0.0) {
            return Err(Error::Validation(format!(
                "request_timeout must be a positive number of seconds, got {}",
                timeout
            )));
        }

        for search in &self.searches {
            let output = Path::new(&search.output);

            // a missing file is fine, it gets created when results are saved
            if output.is_dir() {
                return Err(Error::Validation(format!(
                    "output for search {} should not be a directory",
                    search.name
                )));
            }

            let parent = match output.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !is_dir_writable(&parent) {
                return Err(Error::Validation(format!(
                    "cannot write to file: {}",
                    search.output
                )));
            }
        }

        Ok(())
    }

    /// Get all enabled searches
    pub fn enabled_searches(&self) -> Vec<&SearchDefinition> {
        self.searches.iter().filter(|s| !s.disabled).collect()
    }
}

/// `true`/`1`/`yes`/`on` and their negations, case-insensitive
fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn is_dir_writable(dir: &Path) -> bool {
    match std::fs::metadata(dir) {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(e) => {
            tracing::debug!("Cannot stat {}: {}", dir.display(), e);
            false
        }
    }
}

/// Credentials, API version and token cache location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// API host, with or without scheme
    pub hostname: String,
    /// Value sent as `X-API-Version` and as the auth `version` field
    pub version: String,
    pub client_id: String,
    pub client_secret: String,
    /// Path appended to the host for token requests
    pub auth_endpoint: String,
    /// Where the token is cached between runs
    pub token_cache_path: PathBuf,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            hostname: "data.thinknum.com".to_string(),
            version: "20151130".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_endpoint: "/api/authorize".to_string(),
            token_cache_path: default_token_cache_path(),
        }
    }
}

impl AuthSettings {
    /// Base URL for every request. Bare hosts get `https://`.
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

fn default_token_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("thinknum").join("token.json"))
        .unwrap_or_else(|| PathBuf::from(".thinknum_token.json"))
}

/// Outgoing HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy used for all requests
    pub proxy: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 60.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxy: None,
        }
    }
}

/// Retry behaviour for paginated queries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Reissues allowed on gateway timeout. `None` retries forever.
    pub max_timeout_retries: Option<u32>,
    /// Reissues allowed on connection-level errors
    pub max_transport_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_timeout_retries: Some(10),
            max_transport_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetrySettings {
    /// Retry immediately with the given bounds, mostly for tests
    pub fn immediate(max_timeout_retries: Option<u32>, max_transport_retries: u32) -> Self {
        Self {
            max_timeout_retries,
            max_transport_retries,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Backoff before the given retry (1-based), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}
