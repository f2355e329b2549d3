use regex::Regex;
use std::sync::LazyLock;

use crate::core::tags::PATTERNS;

static SXE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bS(\d{1,2})E(\d{1,2}(?:-\d{1,2})?)\b").unwrap());

/// Located `SxxExx` token. `start..end` is the byte range of the whole token
/// in the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEpisode {
    pub season: u32,
    /// Literal episode text, e.g. "04" or "04-05".
    pub episode: String,
    pub start: usize,
    pub end: usize,
}

impl SeasonEpisode {
    pub fn episode_numbers(&self) -> Vec<u32> {
        episode_numbers(&self.episode)
    }
}

/// First `SxxExx` (optionally `SxxExx-yy`) token in `text`.
pub fn extract_sxe(text: &str) -> Option<SeasonEpisode> {
    let caps = SXE.captures(text)?;
    let whole = caps.get(0)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().to_string();
    Some(SeasonEpisode {
        season,
        episode,
        start: whole.start(),
        end: whole.end(),
    })
}

/// Split an episode string on `-`; fragments that are not integers are dropped.
pub fn episode_numbers(episode: &str) -> Vec<u32> {
    episode
        .split('-')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

/// First 19xx/20xx token.
pub fn extract_year(text: &str) -> Option<i32> {
    PATTERNS
        .year
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_sxe() {
        let text = "Show.Name.S04E04.HDTV";
        let se = extract_sxe(text).unwrap();
        assert_eq!(se.season, 4);
        assert_eq!(se.episode, "04");
        assert_eq!(&text[se.start..se.end], "S04E04");
    }

    #[test]
    fn test_lowercase_short() {
        let se = extract_sxe("show s1e2 pilot").unwrap();
        assert_eq!(se.season, 1);
        assert_eq!(se.episode, "2");
    }

    #[test]
    fn test_episode_range() {
        let se = extract_sxe("Show.Name.S01E02-03.mkv").unwrap();
        assert_eq!(se.episode, "02-03");
        assert_eq!(se.episode_numbers(), vec![2, 3]);
    }

    #[test]
    fn test_repeated_e_prefix_not_a_range() {
        // Only the first episode is taken; a second `E` prefix is not a range.
        let se = extract_sxe("Show.S01E02E03.mkv");
        assert!(se.is_none());
        let se = extract_sxe("Show.S01E02-E03.mkv").unwrap();
        assert_eq!(se.episode, "02");
    }

    #[test]
    fn test_no_sxe() {
        assert_eq!(extract_sxe("The.Matrix.1999.1080p"), None);
        assert_eq!(extract_sxe("ShowS01E01"), None);
    }

    #[test]
    fn test_episode_numbers_drops_garbage() {
        assert_eq!(episode_numbers("04-xx-05"), vec![4, 5]);
        assert!(episode_numbers("").is_empty());
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("The Daily Show 2023 10 26"), Some(2023));
        assert_eq!(extract_year("Show.1080p.x264"), None);
    }
}
