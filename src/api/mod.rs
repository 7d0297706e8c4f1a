//! Thinknum connections API
//!
//! Paginated queries plus the dataset and ticker listings, all sharing one
//! authenticated [`Session`].

mod catalog;
mod pagination;

pub use pagination::{FetchResult, PageCursor, PaginatedFetcher};

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, HttpClient};
use url::Url;

/// Client, base URL, API version and credential of one run.
/// Cloned freely; nothing in it changes once the run starts.
#[derive(Clone)]
pub struct Session {
    client: HttpClient,
    base_url: String,
    version: String,
    credential: Credential,
}

impl Session {
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        version: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            version: version.into(),
            credential,
        }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// URL of the paginated query endpoint of a dataset
    pub fn query_endpoint(&self, dataset_id: &str) -> Result<String> {
        if dataset_id.is_empty() {
            return Err(Error::Validation("no dataset provided".to_string()));
        }
        endpoint(
            &self.base_url,
            &["connections", "dataset", dataset_id, "query", "new"],
        )
    }

    fn authorized(&self, request: ApiRequest) -> ApiRequest {
        request.authorized(&self.credential.token, &self.version)
    }
}

/// Join escaped path segments onto the base URL
pub fn endpoint(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::Validation(format!("invalid base url {}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::Validation(format!("base url {} cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url.to_string())
}
