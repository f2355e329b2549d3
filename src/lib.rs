//! Media file identification and search.
//!
//! Filenames are classified as movies, TV episodes or other files by regex
//! heuristics, and searched with either exact or smart (normalized) matching.

pub mod config;
pub mod core;
pub mod error;
pub mod models;

pub use crate::config::Settings;
pub use crate::core::batch::{BatchProcessor, BatchReport, BatchRequest, BatchStatus};
pub use crate::core::classifier::classify;
pub use crate::core::matcher::{TermMatcher, is_match};
pub use crate::core::search::{CancelToken, SearchOutcome, SearchStatus, search};
pub use crate::core::service::SearchService;
pub use crate::error::SearchError;
pub use crate::models::{Category, CategoryFilter, MatchResult, ParsedMetadata, ScannedFile, SearchQuery};
