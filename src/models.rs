use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ── Enums ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movie,
    TvShow,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::TvShow => "tv",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TV Show",
            Self::Other => "Other",
        }
    }

    pub const ALL: &[Category] = &[Self::Movie, Self::TvShow, Self::Other];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category restriction applied after a file has matched the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Movie,
    TvShow,
    Other,
}

impl CategoryFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Movie => "movie",
            Self::TvShow => "tv",
            Self::Other => "other",
        }
    }

    /// Accepts the short names as well as the display labels ("TV Show").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "movie" | "movies" => Some(Self::Movie),
            "tv" | "tv show" | "tv_show" | "tvshow" | "show" => Some(Self::TvShow),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn admits(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Movie => category == Category::Movie,
            Self::TvShow => category == Category::TvShow,
            Self::Other => category == Category::Other,
        }
    }

    pub const ALL: &[CategoryFilter] = &[Self::All, Self::Movie, Self::TvShow, Self::Other];
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many results a batch keeps per term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceMode {
    Single,
    #[default]
    Multiple,
}

impl InstanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }
}

impl fmt::Display for InstanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Parsed metadata ──

/// Release tokens read from a filename stem. Each field is the literal
/// matched text, absent when no pattern matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTags {
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub video_format: Option<String>,
    pub audio_format: Option<String>,
    pub group_tag: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub bit_depth: Option<String>,
    pub hdr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvDetails {
    pub title: String,
    pub season: Option<u32>,
    /// Literal episode text, may be a range like "04-05".
    pub episode: Option<String>,
    pub episode_title: Option<String>,
    /// Only set for dated shows without an SxxExx token.
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum MediaDetails {
    Movie(MovieDetails),
    TvShow(TvDetails),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMetadata {
    pub original_filename: String,
    #[serde(flatten)]
    pub tags: ReleaseTags,
    #[serde(flatten)]
    pub details: MediaDetails,
}

impl ParsedMetadata {
    pub fn other(original_filename: impl Into<String>) -> Self {
        Self {
            original_filename: original_filename.into(),
            tags: ReleaseTags::default(),
            details: MediaDetails::Other,
        }
    }

    pub fn category(&self) -> Category {
        match self.details {
            MediaDetails::Movie(_) => Category::Movie,
            MediaDetails::TvShow(_) => Category::TvShow,
            MediaDetails::Other => Category::Other,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.details {
            MediaDetails::Movie(m) => Some(&m.title),
            MediaDetails::TvShow(t) => Some(&t.title),
            MediaDetails::Other => None,
        }
    }
}

// ── Search inputs and outputs ──

/// A candidate file yielded by the walker. `size_bytes` is -1 when the size
/// could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size_bytes: i64,
}

impl ScannedFile {
    pub const UNKNOWN_SIZE: i64 = -1;

    pub fn new(path: impl Into<PathBuf>, size_bytes: i64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    pub fn known_size(&self) -> Option<u64> {
        u64::try_from(self.size_bytes).ok()
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub location: PathBuf,
    pub category_filter: CategoryFilter,
    pub exact_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub file: ScannedFile,
    pub metadata: ParsedMetadata,
}

impl MatchResult {
    pub fn category(&self) -> Category {
        self.metadata.category()
    }
}

/// Human readable size; unknown sizes render as "unknown".
pub fn format_size(size_bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let Ok(bytes) = u64::try_from(size_bytes) else {
        return "unknown".to_string();
    };
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_admits() {
        assert!(CategoryFilter::All.admits(Category::Other));
        assert!(CategoryFilter::TvShow.admits(Category::TvShow));
        assert!(!CategoryFilter::Movie.admits(Category::TvShow));
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(CategoryFilter::parse("TV Show"), Some(CategoryFilter::TvShow));
        assert_eq!(CategoryFilter::parse(" all "), Some(CategoryFilter::All));
        assert_eq!(CategoryFilter::parse("music"), None);
    }

    #[test]
    fn test_category_names_parse_back() {
        for category in Category::ALL {
            let filter = CategoryFilter::parse(category.as_str()).unwrap();
            assert!(filter.admits(*category));
            assert_eq!(CategoryFilter::parse(category.label()), Some(filter));
        }
        for filter in CategoryFilter::ALL {
            assert_eq!(CategoryFilter::parse(filter.as_str()), Some(*filter));
        }
    }

    #[test]
    fn test_title_only_for_parsed_media() {
        let other = ParsedMetadata::other("notes.txt");
        assert_eq!(other.title(), None);
        let movie = ParsedMetadata {
            original_filename: "Heat.1995".into(),
            tags: ReleaseTags::default(),
            details: MediaDetails::Movie(MovieDetails {
                title: "heat".into(),
                year: Some("1995".into()),
            }),
        };
        assert_eq!(movie.title(), Some("heat"));
    }

    #[test]
    fn test_unknown_size() {
        let f = ScannedFile::new("/tmp/x.mkv", ScannedFile::UNKNOWN_SIZE);
        assert_eq!(f.known_size(), None);
        assert_eq!(format_size(-1), "unknown");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
    }

    #[test]
    fn test_metadata_serializes_with_category() {
        let meta = ParsedMetadata::other("notes.txt");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["category"], "other");
        assert_eq!(json["original_filename"], "notes.txt");
    }
}
