use std::path::PathBuf;
use thiserror::Error;

/// Rejections surfaced to the caller before any scanning starts.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search location '{}' is not a valid directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("a search is already in progress")]
    AlreadyRunning,

    #[error("a batch process is already running")]
    BatchAlreadyRunning,
}
