use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::core::classifier::classify_file;
use crate::core::matcher::TermMatcher;
use crate::models::{MatchResult, ScannedFile, SearchQuery};

/// Cooperative cancellation flag shared between a search and whoever may
/// stop it. Also records whether the work was actually cut short, so a stop
/// arriving after the last file does not turn a finished search into a
/// partial one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    requested: Arc<AtomicBool>,
    cut_short: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Checked by workers before each unit of work. Returns true when the
    /// worker must stop, and remembers that something was left undone.
    pub fn should_stop(&self) -> bool {
        if self.is_cancelled() {
            self.cut_short.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn stopped_early(&self) -> bool {
        self.cut_short.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<MatchResult>,
    pub status: SearchStatus,
    pub files_examined: usize,
}

impl SearchOutcome {
    pub fn was_cancelled(&self) -> bool {
        self.status == SearchStatus::Cancelled
    }

    /// Sum of sizes that could be read; `-1` sizes are skipped.
    pub fn total_known_bytes(&self) -> u64 {
        self.results.iter().filter_map(|r| r.file.known_size()).sum()
    }
}

/// Match, classify and filter a stream of candidates.
///
/// `query.location` is not consulted; the candidates are assumed to come from
/// it already. The token is checked before every candidate and whatever was
/// accepted up to that point is returned.
pub fn search<I>(query: &SearchQuery, candidates: I, cancel: &CancelToken) -> SearchOutcome
where
    I: IntoIterator<Item = ScannedFile>,
{
    let matcher = TermMatcher::new(&query.term, query.exact_match);
    let mut results = Vec::new();
    let mut files_examined = 0;

    info!(
        "Searching for '{}' (exact: {}, filter: {})",
        query.term, query.exact_match, query.category_filter
    );

    for file in candidates {
        if cancel.should_stop() {
            break;
        }
        files_examined += 1;

        if !matcher.matches(&file.file_name()) {
            continue;
        }

        let result = classify_file(file);
        if query.category_filter.admits(result.category()) {
            results.push(result);
        } else {
            debug!(
                "Skipping '{}' ({}) for filter {}",
                result.file.path.display(),
                result.category(),
                query.category_filter
            );
        }
    }

    // Either this loop or the walker feeding it may have given up early
    let status = if cancel.stopped_early() {
        SearchStatus::Cancelled
    } else {
        SearchStatus::Completed
    };

    info!(
        "Search for '{}' {:?}: {} results from {} files",
        query.term,
        status,
        results.len(),
        files_examined
    );

    SearchOutcome {
        results,
        status,
        files_examined,
    }
}
