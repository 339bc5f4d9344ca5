//! Pipeline driver: raw track names in, catalog IDs out.

use std::path::Path;
use std::time::Instant;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{error, info, info_span};

use crate::catalog::{PlaylistWriter, TrackSearch};
use crate::error::{ImportError, Result};
use crate::models::{MatchSettings, RunReport, RunStats, TrackOutcome};
use crate::normalize::parse_track_name;
use crate::playlist::{publish_playlist, PublishedPlaylist};
use crate::select::select_matches;

/// Resolve one raw track name.
/// The long title (with its qualifier) is tried first, the short title
/// only if that finds nothing.
pub fn resolve_track<S: TrackSearch + ?Sized>(
    catalog: &S,
    raw_name: &str,
    settings: &MatchSettings,
) -> Result<TrackOutcome> {
    let Some(parsed) = parse_track_name(raw_name) else {
        return Ok(TrackOutcome::Unparsed);
    };

    if let Some(long) = parsed.long_query() {
        let ids = select_matches(catalog, &long, settings)?;
        if !ids.is_empty() {
            return Ok(TrackOutcome::LongForm(ids));
        }
    }

    let ids = select_matches(catalog, &parsed.short_query(), settings)?;
    if !ids.is_empty() {
        return Ok(TrackOutcome::ShortForm(ids));
    }

    error!("no good matches for track {} -- {}.", parsed.artist, parsed.title);
    Ok(TrackOutcome::NoMatch)
}

/// Resolve every input track.
///
/// With `workers > 1` tracks are looked up on a dedicated thread pool; the
/// report keeps input order either way. Tracks without a match are absent
/// from `results` but still counted in `stats.total_inputs`.
pub fn run<S: TrackSearch + ?Sized>(
    catalog: &S,
    names: &[String],
    settings: &MatchSettings,
    workers: usize,
    progress: &ProgressBar,
) -> Result<RunReport> {
    let start = Instant::now();

    let resolve = |name: &String| -> Result<TrackOutcome> {
        let span = info_span!("track", name = %name);
        let _enter = span.enter();
        let outcome = resolve_track(catalog, name, settings);
        progress.inc(1);
        outcome
    };

    let outcomes: Vec<TrackOutcome> = if workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| ImportError::Config(format!("failed to build worker pool: {}", e)))?;
        pool.install(|| names.par_iter().map(&resolve).collect::<Result<Vec<_>>>())?
    } else {
        names.iter().map(&resolve).collect::<Result<Vec<_>>>()?
    };

    let mut stats = RunStats {
        total_inputs: names.len(),
        ..Default::default()
    };
    let mut results = Vec::new();
    for outcome in outcomes {
        stats.record(&outcome);
        if let Some(ids) = outcome.into_match() {
            results.push(ids);
        }
    }
    stats.elapsed_seconds = start.elapsed().as_secs_f64();

    progress.finish_with_message(format!(
        "Matched {}/{} tracks",
        stats.matched_tracks(),
        stats.total_inputs
    ));
    info!(
        "matched {} of {} tracks ({} long form, {} short form, {} unparsed, {} without match)",
        stats.matched_tracks(),
        stats.total_inputs,
        stats.long_form_matches,
        stats.short_form_matches,
        stats.parse_failures,
        stats.no_matches
    );

    Ok(RunReport { results, stats })
}

/// Line printed at the end of a dry run
pub fn dry_run_summary(stats: &RunStats) -> String {
    format!(
        "dry run finished! found matches for {:.2}% of inputs.",
        stats.match_rate()
    )
}

/// Everything an import run needs besides the catalog and the track names
#[derive(Debug, Clone)]
pub struct ImportOptions<'a> {
    /// Account the playlist is created for
    pub owner: &'a str,
    pub playlist_name: &'a str,
    pub settings: MatchSettings,
    pub workers: usize,
    pub public: bool,
    pub dry_run: bool,
    /// Where to write the run statistics as JSON
    pub stats_path: Option<&'a Path>,
}

/// Successful end of an import run
#[derive(Debug, Clone)]
pub enum ImportSummary {
    DryRun(RunStats),
    Published(PublishedPlaylist),
}

impl ImportSummary {
    /// Final line shown to the user
    pub fn message(&self) -> String {
        match self {
            ImportSummary::DryRun(stats) => dry_run_summary(stats),
            ImportSummary::Published(playlist) => {
                format!("success: new playlist has {} entries!", playlist.total)
            }
        }
    }
}

/// Match all tracks, then publish them unless this is a dry run.
///
/// Stats are written before the zero-match check so failed runs can be
/// inspected. No matches at all is an error, in dry runs too.
pub fn import<C: TrackSearch + PlaylistWriter + ?Sized>(
    catalog: &C,
    names: &[String],
    options: &ImportOptions<'_>,
    progress: &ProgressBar,
) -> Result<ImportSummary> {
    let report = run(catalog, names, &options.settings, options.workers.max(1), progress)?;

    if let Some(path) = options.stats_path {
        report.stats.write_to_file(path)?;
    }

    if report.results.is_empty() {
        return Err(ImportError::NoMatches);
    }

    if options.dry_run {
        return Ok(ImportSummary::DryRun(report.stats));
    }

    info!("creating playlist \"{}\"", options.playlist_name);
    let published = publish_playlist(
        catalog,
        options.owner,
        options.playlist_name,
        &report.track_ids(),
        options.public,
    )?;
    Ok(ImportSummary::Published(published))
}
