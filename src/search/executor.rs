//! Search execution

use super::models::{RunOutcome, SearchDefinition};
use crate::api::{PaginatedFetcher, Session};
use crate::config::RetrySettings;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Anything that can turn a search definition into an outcome
#[async_trait]
pub trait SearchRunner: Send + Sync {
    async fn run(&self, search: SearchDefinition) -> RunOutcome;
}

/// Runs one search against the API with the run's shared session
#[derive(Clone)]
pub struct SearchExecutor {
    session: Session,
    fetcher: PaginatedFetcher,
    page_size: u64,
}

impl SearchExecutor {
    /// Create a new search executor
    pub fn new(session: Session, page_size: u64) -> Self {
        let fetcher = PaginatedFetcher::new(session.client().clone(), session.version());
        Self {
            session,
            fetcher,
            page_size,
        }
    }

    /// Set the retry policy used for every page
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.fetcher = self.fetcher.with_retry(retry);
        self
    }

    async fn execute(&self, search: SearchDefinition) -> RunOutcome {
        let start = Instant::now();
        info!("Running search: {}", search.name);

        let endpoint = match self.session.query_endpoint(&search.dataset_id) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!("Search {} not started: {}", search.name, e);
                return RunOutcome::failure(search, e);
            }
        };

        let result = self
            .fetcher
            .fetch(
                &endpoint,
                self.session.credential(),
                self.page_size,
                &search.request,
            )
            .await;

        let elapsed = start.elapsed();
        match result.error {
            None => info!(
                "Search {} done: {} rows of {} in {} pages ({:?})",
                search.name,
                result.data.rows.len(),
                result.data.total,
                result.data.pages,
                elapsed
            ),
            Some(ref e) => error!(
                "Search {} failed after {} pages ({:?}): {}",
                search.name, result.data.pages, elapsed, e
            ),
        }

        RunOutcome {
            search,
            data: result.data,
            error: result.error,
        }
    }
}

#[async_trait]
impl SearchRunner for SearchExecutor {
    async fn run(&self, search: SearchDefinition) -> RunOutcome {
        let span = info_span!("search", name = %search.name);
        self.execute(search).instrument(span).await
    }
}
