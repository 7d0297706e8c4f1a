//! High-level client tying settings, session and worker pool together

use crate::api::Session;
use crate::auth::{Credential, TokenStore};
use crate::config::Settings;
use crate::error::Result;
use crate::network::HttpClient;
use crate::output::{ResultReporter, SaveResult};
use crate::query::{DatasetItem, TickerItem};
use crate::search::{Dispatcher, RunOutcome, SearchDefinition, SearchExecutor, SearchRunner};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// A Thinknum client holding a valid token for the whole run
pub struct Client {
    settings: Settings,
    session: Session,
    executor: Arc<SearchExecutor>,
    reporter: ResultReporter,
}

impl Client {
    /// Build the HTTP client from settings and acquire a token
    pub async fn connect(settings: Settings) -> Result<Self> {
        let http = HttpClient::with_settings(&settings.outgoing)?;
        let credential = TokenStore::new(http.clone(), settings.auth.clone())
            .acquire()
            .await?;
        Ok(Self::new(settings, http, credential))
    }

    /// Create a client from your own HTTP client and credential
    pub fn new(settings: Settings, http: HttpClient, credential: Credential) -> Self {
        let session = Session::new(
            http,
            settings.auth.base_url(),
            settings.auth.version.clone(),
            credential,
        );
        let executor = SearchExecutor::new(session.clone(), settings.page_size)
            .with_retry(settings.retry.clone());

        Self {
            settings,
            session,
            executor: Arc::new(executor),
            reporter: ResultReporter::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// List datasets, optionally filtered by ticker
    pub async fn datasets(&self, ticker: Option<&str>) -> Result<Vec<DatasetItem>> {
        self.session.datasets(ticker).await
    }

    /// List the tickers of a dataset
    pub async fn tickers(&self, dataset_id: &str) -> Result<Vec<TickerItem>> {
        self.session.tickers(dataset_id).await
    }

    /// Run a single search
    pub async fn run_search(&self, search: SearchDefinition) -> RunOutcome {
        self.executor.run(search).await
    }

    /// Run every configured search with `workers` workers
    pub fn run_all(&self, workers: usize) -> Result<mpsc::Receiver<RunOutcome>> {
        let dispatcher = Dispatcher::new(self.executor.clone(), workers)?;
        info!(
            "Running {} searches with {} workers",
            self.settings.enabled_searches().len(),
            workers
        );
        Ok(dispatcher.run_all(self.settings.searches.clone()))
    }

    /// Persist a successful outcome in its requested formats
    pub fn save(&self, outcome: &RunOutcome) -> Vec<SaveResult> {
        self.reporter.save(outcome)
    }
}
