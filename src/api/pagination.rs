//! Paginated query execution
//!
//! A query is fetched page by page with a `start`/`limit` cursor until the
//! server reports no more records. Each page request goes through a small
//! retry state machine: gateway timeouts and connection failures are
//! reissued with backoff up to a bound, every other failure ends the fetch.

use crate::auth::Credential;
use crate::config::RetrySettings;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, ApiResponse, HttpClient};
use crate::query::{AggregatedResult, QueryPage, Request};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// Cursor of one paginated fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Offset of the next page
    pub start: u64,
    /// Page size, fixed for the whole fetch
    pub limit: u64,
    /// Serialized filter payload
    pub request: String,
}

impl PageCursor {
    pub fn new(request: String, limit: u64) -> Self {
        Self {
            start: 0,
            limit,
            request,
        }
    }

    /// Move past the records returned by the last page
    pub fn advance(&mut self, count: u64) {
        self.start += count;
    }

    /// Form POST for the current page
    pub fn to_request(&self, endpoint: &str, credential: &Credential, version: &str) -> ApiRequest {
        ApiRequest::post(endpoint)
            .authorized(&credential.token, version)
            .form_field("request", self.request.as_str())
            .form_field("limit", self.limit.to_string())
            .form_field("start", self.start.to_string())
    }
}

/// Data accumulated by a fetch, plus the error that ended it early.
/// On failure both are populated.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub data: AggregatedResult,
    pub error: Option<Error>,
}

impl FetchResult {
    fn failed(data: AggregatedResult, error: Error) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// States of a single page request
#[derive(Debug)]
enum PageState {
    Requesting,
    Retrying { retry: u32 },
    Succeeded(ApiResponse),
    Failed(Error),
}

/// Runs paginated queries against the data API
#[derive(Clone)]
pub struct PaginatedFetcher {
    client: HttpClient,
    version: String,
    retry: RetrySettings,
}

impl PaginatedFetcher {
    pub fn new(client: HttpClient, version: impl Into<String>) -> Self {
        Self {
            client,
            version: version.into(),
            retry: RetrySettings::default(),
        }
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch every page of a query and merge them
    pub async fn fetch(
        &self,
        endpoint: &str,
        credential: &Credential,
        page_size: u64,
        request: &Request,
    ) -> FetchResult {
        let mut data = AggregatedResult::default();

        if page_size == 0 {
            return FetchResult::failed(
                data,
                Error::Validation("page size must be at least 1".to_string()),
            );
        }

        let payload = match request.to_wire() {
            Ok(payload) => payload,
            Err(e) => return FetchResult::failed(data, e.into()),
        };
        let mut cursor = PageCursor::new(payload, page_size);

        loop {
            let page_request = cursor.to_request(endpoint, credential, &self.version);
            let page: QueryPage = match self.send_page(&page_request).await.and_then(|r| r.json()) {
                Ok(page) => page,
                Err(e) => return FetchResult::failed(data, e),
            };

            let meta = page.metadata.clone();
            data.absorb(page);
            debug!(
                "{} => page {} start={} count={} total={}",
                endpoint, data.pages, cursor.start, meta.count, meta.total
            );

            if !meta.has_more(cursor.start) {
                return FetchResult { data, error: None };
            }

            // total says more remain but nothing came back: never advance forever
            if meta.count == 0 {
                return FetchResult::failed(
                    data,
                    Error::Stalled {
                        start: cursor.start,
                        total: meta.total,
                    },
                );
            }

            cursor.advance(meta.count);
        }
    }

    /// Issue one page request, reissuing it on retryable failures
    async fn send_page(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut timeouts = 0u32;
        let mut transport_failures = 0u32;
        let mut state = PageState::Requesting;

        loop {
            state = match state {
                PageState::Requesting => match self.client.execute(request).await {
                    Ok(resp) if resp.is_success() => PageState::Succeeded(resp),
                    Ok(resp) if resp.is_gateway_timeout() => {
                        timeouts += 1;
                        match self.retry.max_timeout_retries {
                            Some(max) if timeouts > max => PageState::Failed(Error::RetriesExhausted {
                                status: resp.status,
                                attempts: timeouts,
                            }),
                            _ => {
                                warn!("{} => request timeout. Retrying ({})...", request.url, timeouts);
                                PageState::Retrying { retry: timeouts }
                            }
                        }
                    }
                    Ok(resp) => PageState::Failed(Error::Protocol {
                        status: resp.status,
                        body: resp.text,
                    }),
                    Err(Error::Transport(e)) => {
                        transport_failures += 1;
                        if transport_failures > self.retry.max_transport_retries {
                            PageState::Failed(Error::Transport(e))
                        } else {
                            warn!(
                                "{} => {}. Retry ({}/{})...",
                                request.url, e, transport_failures, self.retry.max_transport_retries
                            );
                            PageState::Retrying {
                                retry: transport_failures,
                            }
                        }
                    }
                    Err(e) => PageState::Failed(e),
                },
                PageState::Retrying { retry } => {
                    let delay = self.delay(retry);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    PageState::Requesting
                }
                PageState::Succeeded(resp) => return Ok(resp),
                PageState::Failed(e) => return Err(e),
            };
        }
    }

    /// Backoff with up to 50% random jitter
    fn delay(&self, retry: u32) -> Duration {
        let base = self.retry.backoff(retry);
        let half = base.as_millis() as u64 / 2;
        if half == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=half))
    }
}
