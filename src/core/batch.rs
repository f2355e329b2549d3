use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::core::search::CancelToken;
use crate::core::service::{RunningGuard, SearchService};
use crate::error::SearchError;
use crate::models::{CategoryFilter, InstanceMode, MatchResult, SearchQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub terms: Vec<String>,
    pub location: PathBuf,
    pub category_filter: CategoryFilter,
    pub exact_match: bool,
    pub instance_mode: InstanceMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    NoResults,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub term: String,
    pub results: Vec<MatchResult>,
    pub filter_type: CategoryFilter,
    pub exact_match: bool,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub was_stopped: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn total_files_found(&self) -> usize {
        self.entries.iter().map(|e| e.results.len()).sum()
    }

    pub fn terms_with_results(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == BatchStatus::Completed)
            .count()
    }
}

/// Progress update sent before each term starts.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// 1-based.
    pub index: usize,
    pub total: usize,
    pub term: String,
}

/// One term per non-blank line, trimmed.
pub fn load_terms(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs a list of search terms one after another through a [`SearchService`].
pub struct BatchProcessor {
    service: Arc<SearchService>,
    running: Arc<AtomicBool>,
    stop: std::sync::Mutex<CancelToken>,
}

impl BatchProcessor {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self {
            service,
            running: Arc::new(AtomicBool::new(false)),
            stop: std::sync::Mutex::new(CancelToken::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop after the current term; the current term's walk is cancelled too
    /// and keeps whatever it found so far.
    pub fn stop(&self) {
        self.stop.lock().unwrap_or_else(|e| e.into_inner()).cancel();
        self.service.stop();
        info!("Stop signal sent to batch");
    }

    pub async fn run(
        &self,
        request: BatchRequest,
        progress: Option<mpsc::UnboundedSender<BatchProgress>>,
    ) -> Result<BatchReport, SearchError> {
        if !request.location.is_dir() {
            return Err(SearchError::InvalidRoot(request.location));
        }

        let stop = CancelToken::new();
        let _guard = {
            let mut current = self.stop.lock().unwrap_or_else(|e| e.into_inner());
            if self
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(SearchError::BatchAlreadyRunning);
            }
            *current = stop.clone();
            RunningGuard(self.running.clone())
        };

        Ok(self.run_terms(request, progress, &stop).await)
    }

    async fn run_terms(
        &self,
        request: BatchRequest,
        progress: Option<mpsc::UnboundedSender<BatchProgress>>,
        stop: &CancelToken,
    ) -> BatchReport {
        let started_at = Utc::now();
        let timeout = self.service.settings().batch_term_timeout();
        let total = request.terms.len();
        let mut entries = Vec::with_capacity(total);
        let mut was_stopped = false;

        for (i, term) in request.terms.iter().enumerate() {
            if stop.is_cancelled() {
                info!("Batch stopped by user after {} terms", i);
                was_stopped = true;
                break;
            }

            info!("Searching for term {}/{}: '{}'", i + 1, total, term);
            if let Some(tx) = &progress {
                let _ = tx.send(BatchProgress {
                    index: i + 1,
                    total,
                    term: term.clone(),
                });
            }

            let query = SearchQuery {
                term: term.clone(),
                location: request.location.clone(),
                category_filter: request.category_filter,
                exact_match: request.exact_match,
            };

            let outcome = match self.service.start(query) {
                Ok(mut rx) => {
                    // A stop that raced the start has to reach this term too
                    if stop.is_cancelled() {
                        self.service.stop();
                    }
                    match tokio::time::timeout(timeout, &mut rx).await {
                        Ok(Ok(outcome)) => Ok(outcome),
                        Ok(Err(_)) => Err("search task ended without a result".to_string()),
                        Err(_) => {
                            warn!("Search for '{}' timed out, cancelling it", term);
                            // The walk keeps the service busy until it sees the stop
                            self.service.stop();
                            let _ = rx.await;
                            Err(format!("search timed out after {}s", timeout.as_secs()))
                        }
                    }
                }
                Err(e) => Err(e.to_string()),
            };

            let entry = match outcome {
                Ok(outcome) => {
                    let mut results = outcome.results;
                    if request.instance_mode == InstanceMode::Single {
                        results.truncate(1);
                    }
                    let status = if results.is_empty() {
                        BatchStatus::NoResults
                    } else {
                        BatchStatus::Completed
                    };
                    BatchEntry {
                        term: term.clone(),
                        results,
                        filter_type: request.category_filter,
                        exact_match: request.exact_match,
                        status,
                        error_message: None,
                    }
                }
                Err(message) => {
                    error!("Batch search for '{}' failed: {}", term, message);
                    BatchEntry {
                        term: term.clone(),
                        results: Vec::new(),
                        filter_type: request.category_filter,
                        exact_match: request.exact_match,
                        status: BatchStatus::Error,
                        error_message: Some(message),
                    }
                }
            };
            entries.push(entry);
        }

        if !was_stopped && stop.is_cancelled() {
            warn!("Batch stop observed during the last term");
            was_stopped = true;
        }

        info!("Batch finished: {} of {} terms processed", entries.len(), total);
        BatchReport {
            entries,
            was_stopped,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
