//! Authorization token as issued by the authentication endpoint

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format of `auth_expires`, e.g. `20240131T235959Z`
pub const EXPIRES_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Token plus expiry used for every data call of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The token string to use in subsequent requests
    #[serde(rename = "auth_token")]
    pub token: String,
    /// Expiry in [`EXPIRES_FORMAT`], UTC
    #[serde(rename = "auth_expires")]
    pub expires: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires: expires_at.format(EXPIRES_FORMAT).to_string(),
        }
    }

    /// Parsed expiry, `None` when the stored value is malformed
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.expires, EXPIRES_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Usable strictly before its expiry. A malformed expiry is never usable.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| now < exp).unwrap_or(false)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
