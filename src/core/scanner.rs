use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::core::classifier::extension_of;
use crate::core::search::CancelToken;
use crate::models::ScannedFile;

/// System and temporary file extensions that are never candidates.
const SYSTEM_EXTENSIONS: &[&str] = &["db", "ini", "git", "log"];

/// Lowercased extensions without the leading dot.
fn excluded_extensions(settings: &Settings) -> Vec<String> {
    SYSTEM_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .chain(
            settings
                .excluded_file_types
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty()),
        )
        .collect()
}

fn is_excluded(file_name: &str, excluded: &[String]) -> bool {
    if file_name.starts_with('.') {
        return true;
    }
    match extension_of(file_name) {
        Some(ext) => excluded.contains(&ext.to_lowercase()),
        None => false,
    }
}

fn to_scanned(entry: &DirEntry) -> ScannedFile {
    let size_bytes = match entry.metadata() {
        Ok(meta) => i64::try_from(meta.len()).unwrap_or(ScannedFile::UNKNOWN_SIZE),
        Err(e) => {
            warn!("Could not get size for {}: {}", entry.path().display(), e);
            ScannedFile::UNKNOWN_SIZE
        }
    };
    ScannedFile::new(entry.path(), size_bytes)
}

/// Walk `root` lazily and yield candidate files.
///
/// `max_scan_depth` counts directory levels: 1 means only files directly in
/// `root`, 0 means no limit. The token is checked before every entry, so a
/// cancelled walk stops between files or between directories.
pub fn scan_files<'a>(
    root: &Path,
    settings: &Settings,
    cancel: &'a CancelToken,
) -> impl Iterator<Item = ScannedFile> + use<'a> {
    let mut walker = WalkDir::new(root).follow_links(false);
    if settings.max_scan_depth > 0 {
        walker = walker.max_depth(settings.max_scan_depth);
    }
    let excluded = excluded_extensions(settings);

    walker
        .into_iter()
        .take_while(move |_| {
            if cancel.should_stop() {
                debug!("Walk stopped by cancellation");
                false
            } else {
                true
            }
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| {
            let name = entry.file_name().to_string_lossy();
            if is_excluded(&name, &excluded) {
                debug!("Skipping system/hidden file '{}'", name);
                false
            } else {
                true
            }
        })
        .map(|entry| to_scanned(&entry))
}
