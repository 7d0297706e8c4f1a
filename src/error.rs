//! Error types shared across the client

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the API or persisting results
#[derive(Debug, Error)]
pub enum Error {
    /// The authentication endpoint refused to issue a token
    #[error("auth api responded with code {status}: {body}")]
    Auth { status: u16, body: String },

    /// Connection-level failure issuing a request
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status that is not worth retrying
    #[error("code: {status}, body: {body}")]
    Protocol { status: u16, body: String },

    /// A retryable status kept coming back after the retry bound was reached
    #[error("gave up after {attempts} attempts, last status {status}")]
    RetriesExhausted { status: u16, attempts: u32 },

    /// The server reported more records but returned an empty page
    #[error("no progress at offset {start} with {total} records reported")]
    Stalled { start: u64, total: u64 },

    /// Malformed response body or unserializable request payload
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Required input missing or out of range
    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("config error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("type not supported: {0}")]
    UnsupportedFormat(String),

    /// A worker panicked while running the named search
    #[error("search {0} panicked")]
    Panicked(String),
}

impl Error {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. }
            | Self::Protocol { status, .. }
            | Self::RetriesExhausted { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}
