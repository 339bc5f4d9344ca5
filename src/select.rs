//! Candidate selection: search, deduplicate, score and filter.

use rustc_hash::FxHashSet;
use tracing::info;

use crate::catalog::TrackSearch;
use crate::error::Result;
use crate::models::{CatalogMatch, MatchResult, MatchSettings, ScoredMatch, TrackQuery, VersionFilter};
use crate::scoring::{edit_distance_score, token_set_score_with};

/// Fewest results to request; the top hit isn't always the right one
pub const MIN_SEARCH_LIMIT: usize = 6;

/// Over-fetch so enough candidates survive dedup and filtering
pub fn search_limit(max_matches: usize) -> usize {
    (max_matches * 2).max(MIN_SEARCH_LIMIT)
}

/// Drop candidates whose (artist, title) was already seen.
/// Sorting by release date first keeps the earliest release, which avoids
/// compilations and live re-releases when there is a choice.
pub fn dedupe_candidates(mut matches: Vec<CatalogMatch>) -> Vec<CatalogMatch> {
    matches.sort_by(|a, b| a.release_date.cmp(&b.release_date));

    let mut known: FxHashSet<TrackQuery> = FxHashSet::default();
    matches
        .into_iter()
        .filter(|m| known.insert(m.as_query()))
        .collect()
}

/// Score every candidate against the query, best first.
/// Ties keep their relative order.
pub fn rank_candidates<'a>(
    candidates: &'a [CatalogMatch],
    query: &TrackQuery,
    versions: VersionFilter,
) -> Vec<ScoredMatch<'a>> {
    let mut scored: Vec<ScoredMatch<'a>> = candidates
        .iter()
        .map(|candidate| ScoredMatch {
            score: token_set_score_with(&candidate.as_query(), query, versions),
            candidate,
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Look up catalog IDs for one query.
/// Returns at most `max_matches` IDs, all scoring at least `min_quality`;
/// an empty result is not an error.
pub fn select_matches<S: TrackSearch + ?Sized>(
    catalog: &S,
    query: &TrackQuery,
    settings: &MatchSettings,
) -> Result<MatchResult> {
    let results = catalog.search_tracks(&query.search_text(), 0, search_limit(settings.max_matches))?;

    let unique = dedupe_candidates(results);
    let ranked = rank_candidates(&unique, query, settings.versions);

    let good: Vec<&ScoredMatch> = ranked
        .iter()
        .take(settings.max_matches)
        .filter(|m| m.score >= settings.min_quality)
        .collect();

    if good.is_empty() {
        if let Some(best) = ranked.first() {
            let found = best.candidate.as_query();
            info!(
                "best match for track \"{} -- {}\" was \"{} -- {}\" with score {} (edit distance score {})",
                query.artist,
                query.title,
                found.artist,
                found.title,
                best.score,
                edit_distance_score(&found, query)
            );
        }
    }

    Ok(good.iter().map(|m| m.candidate.id.clone()).collect())
}
