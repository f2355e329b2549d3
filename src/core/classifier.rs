use std::path::Path;
use tracing::debug;

use crate::core::parser::{parse_movie, parse_tv};
use crate::models::{MatchResult, MediaDetails, ParsedMetadata, ScannedFile};

/// Decide the category of a file from its name and parse it accordingly.
///
/// TV is tried first: an `SxxExx` token is a stronger signal than the
/// presence-based movie heuristic.
pub fn classify(path: &Path, size_bytes: i64) -> MatchResult {
    classify_file(ScannedFile::new(path, size_bytes))
}

pub fn classify_file(file: ScannedFile) -> MatchResult {
    let metadata = classify_name(&file.file_name());
    MatchResult { file, metadata }
}

/// Classify a bare file name (extension included).
pub fn classify_name(file_name: &str) -> ParsedMetadata {
    let stem = stem_of(file_name);

    let tv = parse_tv(stem);
    if let MediaDetails::TvShow(details) = &tv.details {
        if details.season.is_some() && details.episode.is_some() {
            return tv;
        }
    }

    let movie = parse_movie(stem);
    let has_year = matches!(&movie.details, MediaDetails::Movie(d) if d.year.is_some());
    let movie_signal = has_year
        || movie.tags.resolution.is_some()
        || movie.tags.source.is_some()
        || movie.tags.video_format.is_some();
    if movie_signal {
        return movie;
    }

    debug!("Classified '{}' as Other", file_name);
    ParsedMetadata::other(file_name)
}

/// File name without its final extension. Dotfiles keep their full name.
pub fn stem_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}

/// Final extension, without the dot.
pub fn extension_of(file_name: &str) -> Option<&str> {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => Some(&file_name[pos + 1..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_tv_precedence() {
        let r = classify(Path::new("/media/Show.Name.S02E05.1080p.BluRay.x264.mkv"), 1024);
        assert_eq!(r.category(), Category::TvShow);
        assert_eq!(r.file.size_bytes, 1024);
    }

    #[test]
    fn test_resolution_means_movie() {
        for name in ["Home.Movie.720p.mkv", "Something 2160p.mp4", "clip.4k.webm"] {
            assert_eq!(classify_name(name).category(), Category::Movie, "{name}");
        }
    }

    #[test]
    fn test_year_means_movie() {
        let meta = classify_name("Casablanca (1942).avi");
        assert_eq!(meta.category(), Category::Movie);
    }

    #[test]
    fn test_other() {
        let meta = classify_name("grocery list.txt");
        assert_eq!(meta.category(), Category::Other);
        assert_eq!(meta.original_filename, "grocery list.txt");
        assert_eq!(meta.tags.group_tag, None);
    }

    #[test]
    fn test_daily_show_is_movie_without_sxe() {
        let meta = classify_name("The.Daily.Show.2023.10.26.mkv");
        assert_eq!(meta.category(), Category::Movie);
    }

    #[test]
    fn test_unknown_size_tolerated() {
        let r = classify(Path::new("Film.2001.mkv"), -1);
        assert_eq!(r.category(), Category::Movie);
        assert_eq!(r.file.known_size(), None);
    }

    #[test]
    fn test_stem_and_extension() {
        assert_eq!(stem_of("a.tar.gz"), "a.tar");
        assert_eq!(stem_of(".bashrc"), ".bashrc");
        assert_eq!(stem_of("noext"), "noext");
        assert_eq!(extension_of("Movie.MKV"), Some("MKV"));
        assert_eq!(extension_of(".hidden"), None);
    }
}
