use regex::Regex;
use std::sync::LazyLock;

use crate::core::episode::{extract_sxe, extract_year};
use crate::core::tags::{self, normalize, strip_all_tags};
use crate::models::{MediaDetails, MovieDetails, ParsedMetadata, TvDetails};

/// Leftovers that are release noise rather than an episode title.
const EPISODE_TITLE_STOPLIST: &[&str] = &[
    "hdtv", "webrip", "bluray", "x264", "x265", "killers", "proper", "repack",
];

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[.\s-]?\d{2}[.\s-]?\d{2}\b").unwrap());

/// Parse a filename stem as a movie. Always produces a Movie record; whether
/// it is really a movie is decided by the classifier.
pub fn parse_movie(stem: &str) -> ParsedMetadata {
    let tags = tags::read_tags(stem);
    let details = MovieDetails {
        title: strip_all_tags(stem),
        year: tags::find_year(stem),
    };

    ParsedMetadata {
        original_filename: stem.to_string(),
        tags,
        details: MediaDetails::Movie(details),
    }
}

/// Parse a filename stem as a TV episode.
pub fn parse_tv(stem: &str) -> ParsedMetadata {
    let mut details = TvDetails::default();

    // 1. SxxExx wins over any date or year in the name
    if let Some(se) = extract_sxe(stem) {
        details.season = Some(se.season);
        details.episode = Some(se.episode.clone());

        // 2. Episode title is whatever survives tag stripping after the token
        let mut after = stem[se.end..].trim();
        if let Some(rest) = after.strip_prefix('.').or_else(|| after.strip_prefix('-')) {
            after = rest.trim();
        }
        details.episode_title = clean_episode_title(after);

        // 3. Series title is the part before the token
        details.title = strip_all_tags(stem[..se.start].trim());
    } else if let Some(year) = extract_year(stem) {
        // 4. Dated/daily show: drop the date, keep the rest as title
        details.year = Some(year);
        let without_date = DATE_TOKEN.replace_all(stem, "");
        details.title = strip_all_tags(without_date.trim());
    } else {
        details.title = strip_all_tags(stem);
    }

    // 5. Title must never be empty
    details.title = normalize(&details.title);
    if details.title.is_empty() {
        details.title = normalize(stem);
    }

    ParsedMetadata {
        original_filename: stem.to_string(),
        tags: tags::read_tags(stem),
        details: MediaDetails::TvShow(details),
    }
}

fn clean_episode_title(text: &str) -> Option<String> {
    let candidate = strip_all_tags(text);
    if candidate.is_empty() || EPISODE_TITLE_STOPLIST.contains(&candidate.as_str()) {
        None
    } else {
        Some(candidate)
    }
}
