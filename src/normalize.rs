//! Filename normalization and parsing.
//!
//! Turns a raw track name (a filename stem) into a structured
//! artist / title / extra guess. The common shape is
//! "Artist - Title (extra info)".

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;
use unicode_normalization::UnicodeNormalization;

use crate::models::ParsedTrack;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// En/em dashes used as the artist-title separator
pub static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[–—]").unwrap());

/// Characters used as word separators in filenames: "Artist_Name", "Song.Title", "A & B"
pub static SEPARATOR_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._&]").unwrap());

/// Filler words and version markers that only add noise to a search.
/// The trailing dot of "ft." / "feat." is already gone after SEPARATOR_CHARS.
pub static MARKER_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:and|the|feat|ft|rmx|remix|official)\b").unwrap()
});

/// Bracket pairs emptied by marker removal: "(Official Remix)" → "( )"
pub static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").unwrap());

/// Regex to collapse multiple whitespace into single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Artist (up to the first hyphen run), title (up to the next hyphen or
/// opening bracket), then everything else.
pub static TRACK_NAME_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^-]+)-+([^-(\[]+)(.*)").unwrap());

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Drop characters and words that hurt matching.
/// Casing outside the replaced spans is preserved.
pub fn normalize_track_name(name: &str) -> String {
    // Decomposed filenames (macOS) must be recomposed before matching
    let mut result: String = name.nfc().collect();

    result = DASHES.replace_all(&result, "-").to_string();
    result = SEPARATOR_CHARS.replace_all(&result, " ").to_string();
    result = MARKER_WORDS.replace_all(&result, " ").to_string();
    result = EMPTY_BRACKETS.replace_all(&result, " ").to_string();

    MULTI_SPACE.replace_all(&result, " ").trim().to_string()
}

/// Parse a raw track name into artist, title and trailing extra text.
/// Returns None (and logs) when the name doesn't look like "artist - title".
pub fn parse_track_name(name: &str) -> Option<ParsedTrack> {
    let normalized = normalize_track_name(name);

    let parsed = TRACK_NAME_SCHEME.captures(&normalized).and_then(|caps| {
        let artist = caps.get(1)?.as_str().trim();
        let title = caps.get(2)?.as_str().trim();
        let title_extra = caps.get(3).map_or("", |m| m.as_str()).trim();

        if artist.is_empty() || title.is_empty() {
            return None;
        }

        Some(ParsedTrack {
            artist: artist.to_string(),
            title: title.to_string(),
            title_extra: title_extra.to_string(),
        })
    });

    if parsed.is_none() {
        error!("could not parse track ---> {}", normalized);
    }
    parsed
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> (String, String, String) {
        let p = parse_track_name(name).expect("name should parse");
        (p.artist, p.title, p.title_extra)
    }

    #[test]
    fn test_parse_artist_title_extra() {
        assert_eq!(
            parse("Daft Punk - One More Time (Radio Edit)"),
            ("Daft Punk".into(), "One More Time".into(), "(Radio Edit)".into())
        );
    }

    #[test]
    fn test_parse_without_extra() {
        assert_eq!(
            parse("Queen - Bohemian Rhapsody"),
            ("Queen".into(), "Bohemian Rhapsody".into(), String::new())
        );
    }

    #[test]
    fn test_parse_square_bracket_extra() {
        let (_, title, extra) = parse("Nirvana - Lithium [Live at Reading]");
        assert_eq!(title, "Lithium");
        assert_eq!(extra, "[Live at Reading]");
    }

    #[test]
    fn test_parse_strips_separators_and_markers() {
        let (artist, title, extra) = parse("Artist_Name - Song.Title (Official Remix)");
        assert_eq!(artist, "Artist Name");
        assert_eq!(title, "Song Title");
        // Both markers are removed, leaving no qualifier text behind
        assert_eq!(extra, "");

        let normalized = normalize_track_name("Artist_Name - Song.Title (Official Remix)");
        assert!(!normalized.to_lowercase().contains("official"));
        assert!(!normalized.to_lowercase().contains("remix"));
    }

    #[test]
    fn test_parse_marker_words_case_insensitive() {
        assert_eq!(parse("The Beatles - Let It Be").0, "Beatles");
        assert_eq!(parse("Simon & Garfunkel - Mrs. Robinson").0, "Simon Garfunkel");
        assert_eq!(parse("Simon & Garfunkel - Mrs. Robinson").1, "Mrs Robinson");
        assert_eq!(parse("Artist ft. Guest - Song").0, "Artist Guest");
        assert_eq!(parse("Artist FEAT. Guest - Song RMX").1, "Song");
    }

    #[test]
    fn test_marker_words_need_word_boundaries() {
        // "ft" inside "Daft", "the" inside "Theme"
        let (artist, title, _) = parse("Daft Punk - Theme From Rollin");
        assert_eq!(artist, "Daft Punk");
        assert_eq!(title, "Theme From Rollin");
    }

    #[test]
    fn test_parse_preserves_case() {
        assert_eq!(
            parse("MIXED_Case - SoNg"),
            ("MIXED Case".into(), "SoNg".into(), String::new())
        );
    }

    #[test]
    fn test_parse_no_hyphen_is_absent() {
        assert!(parse_track_name("track01").is_none());
        assert!(parse_track_name("Artist Song Title").is_none());
        assert!(parse_track_name("").is_none());
    }

    #[test]
    fn test_parse_empty_title_is_absent() {
        assert!(parse_track_name("Artist - (Live)").is_none());
        assert!(parse_track_name(" - Song").is_none());
    }

    #[test]
    fn test_parse_splits_at_first_hyphen_run() {
        assert_eq!(
            parse("Artist --- Song"),
            ("Artist".into(), "Song".into(), String::new())
        );
        // Hyphenated artists are split early; the rest lands in the extra text
        assert_eq!(
            parse("A-ha - Take On Me"),
            ("A".into(), "ha".into(), "- Take On Me".into())
        );
    }

    #[test]
    fn test_parse_unicode_dashes() {
        assert_eq!(parse("Röyksopp – Eple").1, "Eple");
        assert_eq!(parse("Röyksopp — Eple").0, "Röyksopp");
    }

    #[test]
    fn test_parse_recomposes_decomposed_names() {
        let (artist, _, _) = parse("Beyonce\u{301} - Halo");
        assert_eq!(artist, "Beyonc\u{e9}");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_track_name("  A   and   B  -  C  "), "A B - C");
    }
}
