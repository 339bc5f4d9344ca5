//! Scoring functions for catalog matching.
//!
//! This module contains:
//! - String similarity primitives (full, partial and token-set ratios)
//! - Edit-distance scoring, used for diagnostics
//! - Token-set scoring with live/karaoke suppression, used for ranking
//!
//! All scores are integers from 0 to 100, higher is more similar.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{TrackQuery, VersionFilter};

// ============================================================================
// Regex Patterns
// ============================================================================

/// Versions that are never wanted unless the query asks for them
pub static UNWANTED_VERSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\blive\b").unwrap(),
        Regex::new(r"(?i)\bkaraoke\b").unwrap(),
    ]
});

/// Anything that is not a letter or digit separates tokens
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

// ============================================================================
// Similarity Primitives
// ============================================================================

fn percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Length of the longest common subsequence
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Indel similarity: 2 * LCS / (len a + len b)
fn indel_ratio(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    percent(2.0 * lcs_len(a, b) as f64 / (a.len() + b.len()) as f64)
}

/// Whole-string similarity from the insert/delete edit distance.
/// Empty input never matches anything.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    indel_ratio(&a_chars, &b_chars)
}

/// Substring-tolerant similarity: the best ratio of the shorter string
/// against every window of the same length in the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    let mut best = 0;
    for window in longer.windows(shorter.len()) {
        best = best.max(indel_ratio(shorter, window));
        if best == 100 {
            break;
        }
    }
    best
}

/// Lowercased alphanumeric tokens, deduplicated and sorted
fn token_set(s: &str) -> BTreeSet<String> {
    NON_ALPHANUMERIC
        .split(&s.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a String>) -> String {
    tokens.map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Order- and duplicate-insensitive word-overlap similarity.
/// Compares the shared tokens against each side's full token set, so a
/// string whose words are a subset of the other's scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a = token_set(a);
    let tokens_b = token_set(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let sect = join_tokens(tokens_a.intersection(&tokens_b));
    let diff_ab = join_tokens(tokens_a.difference(&tokens_b));
    let diff_ba = join_tokens(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{} {}", sect, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", sect, diff_ba).trim().to_string();

    ratio(&sect, &combined_ab)
        .max(ratio(&sect, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

// ============================================================================
// Pattern Matching Helpers
// ============================================================================

/// True when `found` is a live/karaoke version that `expected` doesn't ask for
pub fn is_unwanted_version(found: &str, expected: &str) -> bool {
    UNWANTED_VERSION_PATTERNS
        .iter()
        .any(|p| p.is_match(found) && !p.is_match(expected))
}

// ============================================================================
// Match Scoring
// ============================================================================

/// Very basic scoring based on artist / title edit distance.
/// Both fields have to be close: the worse field decides.
pub fn edit_distance_score(found: &TrackQuery, expected: &TrackQuery) -> u8 {
    let a1 = found.artist.to_lowercase();
    let t1 = found.title.to_lowercase();
    let a2 = expected.artist.to_lowercase();
    let t2 = expected.title.to_lowercase();

    let partial_q = partial_ratio(&a1, &a2).min(partial_ratio(&t1, &t2)) as u16;
    let full_q = ratio(&a1, &a2).min(ratio(&t1, &t2)) as u16;
    let q = ((partial_q * 2 + full_q) / 3) as u8;

    debug!(
        "searching for \"{} -- {}\", score is {} for \"{} -- {}\"",
        expected.artist, expected.title, q, found.artist, found.title
    );
    q
}

/// Token-set score with live/karaoke versions suppressed
pub fn token_set_score(found: &TrackQuery, expected: &TrackQuery) -> u8 {
    token_set_score_with(found, expected, VersionFilter::Suppress)
}

/// Token-set score over "artist title"; unrequested live/karaoke versions
/// score 0 unless `versions` allows them.
pub fn token_set_score_with(
    found: &TrackQuery,
    expected: &TrackQuery,
    versions: VersionFilter,
) -> u8 {
    let a = found.search_text();
    let b = expected.search_text();

    if versions == VersionFilter::Suppress && is_unwanted_version(&a, &b) {
        debug!("searching for \"{}\", skipping unwanted version \"{}\"", b, a);
        return 0;
    }

    let q = token_set_ratio(&a, &b);
    debug!("searching for \"{}\", score is {} for \"{}\"", b, q, a);
    q
}
