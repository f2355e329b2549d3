use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{CategoryFilter, InstanceMode};

const SETTINGS_FILE: &str = "settings.json";

/// Settings consumed by the walker and the frontends. None of them change how
/// a name is parsed or matched, only which files are ever looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory levels below the search root; 0 means unlimited.
    pub max_scan_depth: usize,
    pub excluded_file_types: Vec<String>,
    pub default_search_type: CategoryFilter,
    pub default_exact_match: bool,
    pub default_instance_mode: InstanceMode,
    pub batch_term_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_scan_depth: 5,
            excluded_file_types: [".tmp", ".log", ".DS_Store", ".ini", ".db"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_search_type: CategoryFilter::TvShow,
            default_exact_match: false,
            default_instance_mode: InstanceMode::Multiple,
            batch_term_timeout_secs: 3600,
        }
    }
}

/// Get the settings directory.
/// Uses REELFIND_DATA_DIR env var, or falls back to the platform config dir.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REELFIND_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reelfind")
    }
}

impl Settings {
    pub fn batch_term_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_term_timeout_secs)
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&data_dir().join(SETTINGS_FILE));
        if let Ok(depth) = std::env::var("REELFIND_MAX_DEPTH") {
            match depth.trim().parse() {
                Ok(d) => settings.max_scan_depth = d,
                Err(e) => warn!("Ignoring REELFIND_MAX_DEPTH={}: {}", depth, e),
            }
        }
        settings
    }

    /// Read a settings file. A missing or unreadable file yields defaults;
    /// keys absent from the file keep their default values.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Settings file {} not found, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Could not read settings from {}: {}. Using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(settings) => {
                info!("Settings loaded from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Could not parse settings from {}: {}. Using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.max_scan_depth, 5);
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"max_scan_depth": 0, "default_search_type": "movie"}"#).unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.max_scan_depth, 0);
        assert_eq!(s.default_search_type, CategoryFilter::Movie);
        assert_eq!(s.excluded_file_types, Settings::default().excluded_file_types);
        assert_eq!(s.batch_term_timeout(), Duration::from_secs(3600));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
