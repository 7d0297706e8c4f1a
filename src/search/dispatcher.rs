//! Worker pool running many searches concurrently
//!
//! One producer feeds enabled searches into a work channel of capacity 1,
//! `workers` tasks pull from it, and a supervisor closes the outcome stream
//! once every worker has finished.

use super::executor::SearchRunner;
use super::models::{RunOutcome, SearchDefinition};
use crate::error::{Error, Result};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Fans searches out to a fixed number of workers
#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<dyn SearchRunner>,
    workers: usize,
}

impl Dispatcher {
    /// `workers` bounds the number of searches in flight and must be at least 1
    pub fn new(runner: Arc<dyn SearchRunner>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Validation("workers must be at least 1".to_string()));
        }
        Ok(Self { runner, workers })
    }

    /// Run every enabled search. Outcomes arrive in completion order, one per
    /// enabled search; the receiver closes once all of them are delivered.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_all(&self, searches: Vec<SearchDefinition>) -> mpsc::Receiver<RunOutcome> {
        let (work_tx, work_rx) = mpsc::channel::<SearchDefinition>(1);
        let (results_tx, results_rx) = mpsc::channel::<RunOutcome>(self.workers);

        tokio::spawn(produce(searches, work_tx));

        let work_rx = Arc::new(Mutex::new(work_rx));
        let runner = self.runner.clone();
        let workers = self.workers;

        tokio::spawn(async move {
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    tokio::spawn(worker(
                        id,
                        runner.clone(),
                        work_rx.clone(),
                        results_tx.clone(),
                    ))
                })
                .collect();

            for (id, joined) in join_all(handles).await.into_iter().enumerate() {
                if let Err(e) = joined {
                    error!("Worker {} did not finish cleanly: {}", id, e);
                }
            }

            debug!("All {} workers finished", workers);
            // last sender: dropping it closes the outcome stream
            drop(results_tx);
        });

        results_rx
    }

    /// Run every enabled search and wait for all outcomes
    pub async fn collect(&self, searches: Vec<SearchDefinition>) -> Vec<RunOutcome> {
        let mut rx = self.run_all(searches);
        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

async fn produce(searches: Vec<SearchDefinition>, work: mpsc::Sender<SearchDefinition>) {
    for search in searches {
        if search.disabled {
            info!("Skip search: {} [disabled]", search.name);
            continue;
        }
        if work.send(search).await.is_err() {
            warn!("All workers stopped, dropping remaining searches");
            break;
        }
    }
}

async fn worker(
    id: usize,
    runner: Arc<dyn SearchRunner>,
    work: Arc<Mutex<mpsc::Receiver<SearchDefinition>>>,
    results: mpsc::Sender<RunOutcome>,
) {
    loop {
        let next = work.lock().await.recv().await;
        let Some(search) = next else {
            break;
        };

        debug!("Worker {} picked up {}", id, search.name);
        let outcome = match AssertUnwindSafe(runner.run(search.clone()))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Worker {} panicked running {}", id, search.name);
                let name = search.name.clone();
                RunOutcome::failure(search, Error::Panicked(name))
            }
        };

        if results.send(outcome).await.is_err() {
            warn!("Outcome receiver dropped, worker {} stopping", id);
            break;
        }
    }
}
