use regex::Regex;
use std::sync::LazyLock;

use crate::models::ReleaseTags;

// ── Compiled regex patterns ──

pub(crate) struct Patterns {
    pub(crate) year: Regex,
    resolution: Regex,
    source: Regex,
    video_format: Regex,
    audio_format: Regex,
    version: Regex,
    language: Regex,
    bit_depth: Regex,
    hdr: Regex,
    repack: Regex,
    group_tag: Regex,
    separators: Regex,
    multi_spaces: Regex,
}

pub(crate) static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    year: Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap(),
    resolution: Regex::new(r"(?i)\b(480p|700p|720p|1080p|1440p|2160p|4k|8k)\b").unwrap(),
    source: Regex::new(
        r"(?i)\b(WEB-DL|WEBRip|BluRay|BDRip|DVDRip|HDRip|HDTV|DVD|VOD|DDC|CAM|TS|R5|WP|SCR)\b",
    )
    .unwrap(),
    video_format: Regex::new(r"(?i)\b(x264|x265|HEVC|H\.264|H\.265|VP9|AV1|XviD|DivX)\b").unwrap(),
    // Longer alternatives first so DTS-HD is not cut short at DTS
    audio_format: Regex::new(r"(?i)\b(DTS-HD|DTS|AC3|TrueHD|Atmos|DD5\.1|AAC|MP3)\b").unwrap(),
    version: Regex::new(
        r"(?i)\b(PROPER|REPACK|RERIP|EXTENDED|UNCUT|UNRATED|DIRECTORS[._\- ]CUT|REMASTERED|COLLECTORS[._\- ]EDITION)\b",
    )
    .unwrap(),
    language: Regex::new(r"(?i)\b(eng|ita|fre|deu|jpn|kor|spa|rus)(?:dub|sub)?\b").unwrap(),
    bit_depth: Regex::new(r"(?i)\b(8bit|10bit|12bit)\b").unwrap(),
    hdr: Regex::new(r"(?i)\b(HDR10|HDR|DolbyVision|DV)\b").unwrap(),
    repack: Regex::new(r"(?i)\b(REPACK|PROPER)\b").unwrap(),
    // Trailing token after the last separator, or a bracketed token at the end
    group_tag: Regex::new(r"(?:[-_. ]([A-Za-z0-9]+)|[-_. ]?(\[[^\[\]]+\]))$").unwrap(),
    separators: Regex::new(r"[._\-]").unwrap(),
    multi_spaces: Regex::new(r"\s+").unwrap(),
});

/// Canonical loose-comparison form: lowercase, `._-` become spaces,
/// whitespace collapsed, trimmed.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let p = &*PATTERNS;
    let lowered = text.to_lowercase();
    let spaced = p.separators.replace_all(&lowered, " ");
    p.multi_spaces.replace_all(&spaced, " ").trim().to_string()
}

/// Remove every recognized release token, then the trailing group tag, then
/// normalize what is left.
pub fn strip_all_tags(text: &str) -> String {
    let p = &*PATTERNS;
    let ordered = [
        &p.year,
        &p.resolution,
        &p.source,
        &p.video_format,
        &p.audio_format,
        &p.version,
        &p.language,
        &p.bit_depth,
        &p.hdr,
        &p.repack,
    ];

    let mut work = text.to_string();
    for pat in ordered {
        work = pat.replace_all(&work, "").to_string();
    }
    // Group tag goes last so a metadata token sitting at the end is not
    // mistaken for it.
    work = p.group_tag.replace(&work, "").to_string();

    normalize(&work)
}

fn first_match(pattern: &Regex, text: &str) -> Option<String> {
    pattern.find(text).map(|m| m.as_str().to_string())
}

/// Trailing release group, brackets included when present.
pub fn extract_group_tag(text: &str) -> Option<String> {
    PATTERNS
        .group_tag
        .captures(text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
}

/// First year-looking token (1900-2099), as written.
pub fn find_year(text: &str) -> Option<String> {
    first_match(&PATTERNS.year, text)
}

/// Read every release tag from `text` without altering it.
pub fn read_tags(text: &str) -> ReleaseTags {
    let p = &*PATTERNS;
    ReleaseTags {
        resolution: first_match(&p.resolution, text),
        source: first_match(&p.source, text),
        video_format: first_match(&p.video_format, text),
        audio_format: first_match(&p.audio_format, text),
        group_tag: extract_group_tag(text),
        version: first_match(&p.version, text),
        language: first_match(&p.language, text),
        bit_depth: first_match(&p.bit_depth, text),
        hdr: first_match(&p.hdr, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("My.Show_Name-2023"), "my show name 2023");
        assert_eq!(normalize("  A..B  "), "a b");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["My.Show_Name-2023", "__x--y..z  ", "Already normal", "MiXeD.Case"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_strip_movie_tags() {
        assert_eq!(
            strip_all_tags("The.Matrix.1999.1080p.BluRay.x264-DEMAND"),
            "the matrix"
        );
        assert_eq!(strip_all_tags("Inception.2010.2160p.HDR.10bit.DTS-HD"), "inception");
    }

    #[test]
    fn test_strip_bracketed_group() {
        assert_eq!(strip_all_tags("Some.Film.2019.720p.WEBRip[YTS.MX]"), "some film");
    }

    #[test]
    fn test_strip_versions_and_language() {
        assert_eq!(
            strip_all_tags("Alien.1979.DIRECTORS.CUT.REMASTERED.ENG.AAC."),
            "alien"
        );
    }

    #[test]
    fn test_read_tags() {
        let tags = read_tags("Dune.2021.2160p.WEB-DL.x265.10bit.HDR10.Atmos.ITAsub-GRP");
        assert_eq!(tags.resolution.as_deref(), Some("2160p"));
        assert_eq!(tags.source.as_deref(), Some("WEB-DL"));
        assert_eq!(tags.video_format.as_deref(), Some("x265"));
        assert_eq!(tags.audio_format.as_deref(), Some("Atmos"));
        assert_eq!(tags.bit_depth.as_deref(), Some("10bit"));
        assert_eq!(tags.hdr.as_deref(), Some("HDR10"));
        assert_eq!(tags.language.as_deref(), Some("ITAsub"));
        assert_eq!(tags.group_tag.as_deref(), Some("GRP"));
    }

    #[test]
    fn test_dts_hd_kept_whole() {
        assert_eq!(read_tags("Film.DTS-HD.x264").audio_format.as_deref(), Some("DTS-HD"));
    }

    #[test]
    fn test_group_tag_needs_separator() {
        assert_eq!(extract_group_tag("Inception"), None);
        assert_eq!(extract_group_tag("Film.2001[RARBG]").as_deref(), Some("[RARBG]"));
        assert_eq!(extract_group_tag("Film.2001."), None);
    }

    #[test]
    fn test_year_range() {
        assert_eq!(find_year("Old.Film.1899.1955"), Some("1955".to_string()));
        assert_eq!(find_year("Show.1080p"), None);
    }
}
