//! Core data models for the import pipeline.
//!
//! This module contains the track guesses produced from filenames, the
//! candidates returned by the catalog, and the statistics collected per run.

use serde::Serialize;

// ============================================================================
// Type Aliases
// ============================================================================

/// Catalog IDs accepted for one input track, in ranked order
pub type MatchResult = Vec<String>;

// ============================================================================
// Filename Guesses
// ============================================================================

/// Structured guess parsed from a raw track name.
/// `artist` and `title` are never empty; `title_extra` holds trailing
/// bracketed text such as "(Radio Edit)" and may be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTrack {
    pub artist: String,
    pub title: String,
    pub title_extra: String,
}

impl ParsedTrack {
    /// Query including the trailing qualifier text.
    /// Returns None when there is no qualifier to include.
    pub fn long_query(&self) -> Option<TrackQuery> {
        if self.title_extra.is_empty() {
            return None;
        }
        Some(TrackQuery {
            artist: self.artist.clone(),
            title: format!("{} {}", self.title, self.title_extra),
        })
    }

    /// Query with the core title only
    pub fn short_query(&self) -> TrackQuery {
        TrackQuery {
            artist: self.artist.clone(),
            title: self.title.clone(),
        }
    }
}

/// Two-field (artist, title) view used for searching and as the dedup key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackQuery {
    pub artist: String,
    pub title: String,
}

impl TrackQuery {
    /// Free-text search string: searching everything at once works better
    /// than fielded `artist:` / `track:` filters
    pub fn search_text(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Catalog track returned by a search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogMatch {
    pub id: String,           // Catalog track ID (e.g., "0DiWol3AO6WpXZgp0goxAV")
    pub artist: String,       // Primary artist
    pub title: String,        // Track name
    pub release_date: String, // Album release date, "YYYY", "YYYY-MM" or "YYYY-MM-DD"
}

impl CatalogMatch {
    /// (artist, title) projection of this candidate
    pub fn as_query(&self) -> TrackQuery {
        TrackQuery {
            artist: self.artist.clone(),
            title: self.title.clone(),
        }
    }
}

/// Candidate with its similarity score (0-100), used only while ranking
#[derive(Clone, Debug)]
pub struct ScoredMatch<'a> {
    pub score: u8,
    pub candidate: &'a CatalogMatch,
}

// ============================================================================
// Selection Settings
// ============================================================================

/// Whether live and karaoke versions may match a query that doesn't ask for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionFilter {
    /// Force the score of unrequested live/karaoke versions to 0
    #[default]
    Suppress,
    /// Score live/karaoke versions like any other candidate
    Allow,
}

/// Per-run knobs for candidate selection
#[derive(Debug, Clone, Copy)]
pub struct MatchSettings {
    pub max_matches: usize,
    pub min_quality: u8,
    pub versions: VersionFilter,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            max_matches: 1,
            min_quality: 70,
            versions: VersionFilter::Suppress,
        }
    }
}

// ============================================================================
// Pipeline Outcomes
// ============================================================================

/// How a single input track was resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Name did not fit the "artist - title (extra)" shape
    Unparsed,
    /// Matched using title + qualifier text
    LongForm(MatchResult),
    /// Matched using the core title only
    ShortForm(MatchResult),
    /// Parsed, but no candidate cleared the quality bar
    NoMatch,
}

impl TrackOutcome {
    pub fn into_match(self) -> Option<MatchResult> {
        match self {
            TrackOutcome::LongForm(ids) | TrackOutcome::ShortForm(ids) => Some(ids),
            TrackOutcome::Unparsed | TrackOutcome::NoMatch => None,
        }
    }
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Per-run matching statistics.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RunStats {
    pub total_inputs: usize,
    pub parse_failures: usize,
    pub long_form_matches: usize,
    pub short_form_matches: usize,
    pub no_matches: usize,
    pub total_ids: usize,

    // Timing
    pub elapsed_seconds: f64,
}

impl RunStats {
    pub fn record(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Unparsed => self.parse_failures += 1,
            TrackOutcome::LongForm(ids) => {
                self.long_form_matches += 1;
                self.total_ids += ids.len();
            }
            TrackOutcome::ShortForm(ids) => {
                self.short_form_matches += 1;
                self.total_ids += ids.len();
            }
            TrackOutcome::NoMatch => self.no_matches += 1,
        }
    }

    pub fn matched_tracks(&self) -> usize {
        self.long_form_matches + self.short_form_matches
    }

    /// Matched inputs as a percentage of all inputs, unparsed ones included
    pub fn match_rate(&self) -> f64 {
        if self.total_inputs == 0 {
            0.0
        } else {
            100.0 * self.matched_tracks() as f64 / self.total_inputs as f64
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Everything the driver produces for one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Non-empty match results, in input order
    pub results: Vec<MatchResult>,
    pub stats: RunStats,
}

impl RunReport {
    /// All accepted IDs flattened in input order
    pub fn track_ids(&self) -> Vec<String> {
        self.results.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(extra: &str) -> ParsedTrack {
        ParsedTrack {
            artist: "Daft Punk".to_string(),
            title: "One More Time".to_string(),
            title_extra: extra.to_string(),
        }
    }

    #[test]
    fn test_long_query_appends_extra() {
        let query = parsed("(Radio Edit)").long_query().unwrap();
        assert_eq!(query.artist, "Daft Punk");
        assert_eq!(query.title, "One More Time (Radio Edit)");
        assert_eq!(query.search_text(), "Daft Punk One More Time (Radio Edit)");
    }

    #[test]
    fn test_long_query_absent_without_extra() {
        assert!(parsed("").long_query().is_none());
        assert_eq!(parsed("").short_query().title, "One More Time");
    }

    #[test]
    fn test_match_rate_counts_all_inputs() {
        let mut stats = RunStats {
            total_inputs: 4,
            ..Default::default()
        };
        stats.record(&TrackOutcome::Unparsed);
        stats.record(&TrackOutcome::ShortForm(vec!["a".into(), "b".into()]));
        stats.record(&TrackOutcome::NoMatch);
        stats.record(&TrackOutcome::LongForm(vec!["c".into()]));

        assert_eq!(stats.matched_tracks(), 2);
        assert_eq!(stats.total_ids, 3);
        assert!((stats.match_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_rate_empty() {
        assert_eq!(RunStats::default().match_rate(), 0.0);
    }

    #[test]
    fn test_track_ids_flatten_in_order() {
        let report = RunReport {
            results: vec![vec!["a".into(), "b".into()], vec!["c".into()]],
            stats: RunStats::default(),
        };
        assert_eq!(report.track_ids(), vec!["a", "b", "c"]);
    }
}
