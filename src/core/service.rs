use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::Settings;
use crate::core::scanner::scan_files;
use crate::core::search::{CancelToken, SearchOutcome, SearchStatus, search};
use crate::error::SearchError;
use crate::models::SearchQuery;

/// Clears a running flag when dropped, panics included.
pub(crate) struct RunningGuard(pub(crate) Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs one filesystem search at a time on the blocking pool.
pub struct SearchService {
    settings: Arc<Settings>,
    running: Arc<AtomicBool>,
    current: Mutex<CancelToken>,
    #[cfg(test)]
    pause: Mutex<Option<tokio::sync::mpsc::UnboundedSender<()>>>,
}

impl SearchService {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            running: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(CancelToken::new()),
            #[cfg(test)]
            pause: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a search. Rejects an invalid root and a second concurrent start
    /// synchronously; otherwise the outcome arrives on the returned receiver.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, query: SearchQuery) -> Result<oneshot::Receiver<SearchOutcome>, SearchError> {
        if !query.location.is_dir() {
            return Err(SearchError::InvalidRoot(query.location));
        }

        let cancel = CancelToken::new();
        let guard = {
            // Claim the slot and install the token under the lock stop() takes,
            // so a stop cannot land on the previous search's token
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if self
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                warn!("Search is already running, rejecting '{}'", query.term);
                return Err(SearchError::AlreadyRunning);
            }
            *current = cancel.clone();
            RunningGuard(self.running.clone())
        };

        let settings = self.settings.clone();
        let (tx, rx) = oneshot::channel();

        #[cfg(test)]
        let pause = self.pause.lock().unwrap_or_else(|e| e.into_inner()).take();

        info!("Starting search for '{}' in {}", query.term, query.location.display());
        tokio::task::spawn_blocking(move || {
            let files = scan_files(&query.location, &settings, &cancel);
            #[cfg(test)]
            let files = tests::pause_after_first(files, &cancel, pause);
            let outcome = search(&query, files, &cancel);
            // Free the slot before the caller can react to the outcome
            drop(guard);
            let _ = tx.send(outcome);
        });

        Ok(rx)
    }

    /// Start a search and wait for it.
    pub async fn run(&self, query: SearchQuery) -> Result<SearchOutcome, SearchError> {
        let rx = self.start(query)?;
        // The sender only disappears if the task died; treat it as a stop
        Ok(rx.await.unwrap_or_else(|_| SearchOutcome {
            results: Vec::new(),
            status: SearchStatus::Cancelled,
            files_examined: 0,
        }))
    }

    /// Signal the in-flight search, if any, to stop.
    pub fn stop(&self) {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).cancel();
        info!("Stop signal sent to search");
    }
}

#[cfg(test)]
impl SearchService {
    /// Make the next search hold after its first candidate until stopped.
    /// The receiver fires once the search is holding.
    pub(crate) fn pause_next_search(&self) -> tokio::sync::mpsc::UnboundedReceiver<()> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        *self.pause.lock().unwrap() = Some(tx);
        rx
    }
}
