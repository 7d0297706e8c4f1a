//! thinknum-client: concurrent batch runner for the Thinknum connections API
//!
//! Acquires (and caches) an auth token, runs every configured search across a
//! fixed pool of workers, pages through each query's results with retries,
//! and saves the aggregated data as JSON and/or CSV.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod query;
pub mod search;

pub use client::Client;
pub use config::Settings;
pub use error::{Error, Result};
pub use search::{Dispatcher, RunOutcome, SearchDefinition, SearchExecutor};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of concurrent searches
pub const DEFAULT_WORKERS: usize = 4;
