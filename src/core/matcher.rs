use tracing::debug;

use crate::core::classifier::stem_of;
use crate::core::episode::{SeasonEpisode, episode_numbers, extract_sxe};
use crate::core::tags::normalize;

/// A search term prepared once and tested against many file names.
#[derive(Debug, Clone)]
pub enum TermMatcher {
    /// Literal comparison, case-insensitive, surrounding whitespace ignored.
    Exact { term: String },
    /// Normalized substring, then title + season/episode decomposition.
    Smart {
        normalized: String,
        title_part: String,
        season: Option<u32>,
        episodes: Vec<u32>,
    },
}

impl TermMatcher {
    pub fn new(term: &str, exact: bool) -> Self {
        if exact {
            return Self::Exact {
                term: term.trim().to_lowercase(),
            };
        }

        let normalized = normalize(term);
        let (title_part, season, episodes) = match extract_sxe(term) {
            Some(se) => (
                normalize(&term[..se.start]),
                Some(se.season),
                se.episode_numbers(),
            ),
            None => (normalized.clone(), None, Vec::new()),
        };

        if let Some(s) = season {
            debug!("Search term has season {} episodes {:?}, title part '{}'", s, episodes, title_part);
        }

        Self::Smart {
            normalized,
            title_part,
            season,
            episodes,
        }
    }

    /// Test a file name (extension included).
    pub fn matches(&self, file_name: &str) -> bool {
        let stem = stem_of(file_name);
        match self {
            Self::Exact { term } => {
                let full = file_name.trim().to_lowercase();
                let base = stem.trim().to_lowercase();
                let found = *term == full || *term == base;
                if found {
                    debug!("Exact match for '{}'", file_name);
                }
                found
            }
            Self::Smart {
                normalized,
                title_part,
                season,
                episodes,
            } => {
                let normalized_stem = normalize(stem);
                if normalized_stem.contains(normalized.as_str()) {
                    debug!("Substring match '{}' in '{}'", normalized, normalized_stem);
                    return true;
                }
                // A term with neither a season nor a title part has nothing
                // left to compare.
                if season.is_none() && title_part.is_empty() {
                    return false;
                }

                let file_se = extract_sxe(stem);
                let file_title = match &file_se {
                    Some(se) => normalize(&stem[..se.start]),
                    None => normalized_stem,
                };

                let title_match = title_part.is_empty() || file_title.contains(title_part.as_str());
                let episode_match = match season {
                    None => true,
                    Some(s) => sxe_agrees(*s, episodes, file_se.as_ref()),
                };

                debug!(
                    "Smart match '{}': title {} episode {}",
                    file_name, title_match, episode_match
                );
                title_match && episode_match
            }
        }
    }
}

fn sxe_agrees(season: u32, episodes: &[u32], file: Option<&SeasonEpisode>) -> bool {
    let Some(file) = file else {
        return false;
    };
    if file.season != season {
        return false;
    }
    let file_episodes = episode_numbers(&file.episode);
    episodes.iter().any(|e| file_episodes.contains(e))
}

/// One-shot convenience over [`TermMatcher`].
pub fn is_match(term: &str, file_name: &str, exact: bool) -> bool {
    TermMatcher::new(term, exact).matches(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ignores_extension() {
        assert!(is_match("Show S04E04", "Show S04E04.mkv", true));
        assert!(is_match("show s04e04.MKV", "Show S04E04.mkv", true));
    }

    #[test]
    fn test_exact_keeps_punctuation() {
        assert!(!is_match("Show S04E04", "Show.S04E04.mkv", true));
    }

    #[test]
    fn test_smart_substring() {
        assert!(is_match("game of thrones", "Game.of.Thrones.S04E04.1080p.mkv", false));
        assert!(is_match("My_Show", "my-show.2019.mkv", false));
    }

    #[test]
    fn test_smart_title_and_sxe() {
        assert!(is_match("game of s04e04", "Game.of.Thrones.S04E04.1080p.mkv", false));
    }

    #[test]
    fn test_smart_episode_mismatch() {
        assert!(!is_match("Show S01E01", "Show.S01E02.mkv", false));
        assert!(!is_match("Show S02E02", "Show.S01E02.mkv", false));
    }

    #[test]
    fn test_smart_episode_range() {
        assert!(is_match("show s01e03", "Show.S01E02-03.720p.mkv", false));
        assert!(is_match("show s01e02-04", "Show.S01E04.mkv", false));
        assert!(!is_match("show s01e05-06", "Show.S01E02-03.mkv", false));
    }

    #[test]
    fn test_smart_season_without_file_sxe() {
        assert!(!is_match("show s01e01", "Show.Pilot.mkv", false));
    }

    #[test]
    fn test_smart_bare_sxe_term() {
        assert!(is_match("S03E07", "Anything.s03e07.mkv", false));
        assert!(is_match("s3e7", "Anything.S03E07.mkv", false));
        assert!(!is_match("s3e7", "Anything.S03E08.mkv", false));
    }

    #[test]
    fn test_smart_title_mismatch() {
        assert!(!is_match("lost s01e01", "Fringe.S01E01.mkv", false));
    }
}
