//! HTTP networking module
//!
//! Provides the injectable HTTP client and the request/response types used for API calls.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{ApiRequest, ApiResponse, HttpMethod, FORM_CONTENT_TYPE};
