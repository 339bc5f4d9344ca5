use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use playlist_import::config::Credentials;
use playlist_import::input::require_track_names;
use playlist_import::models::{MatchSettings, VersionFilter};
use playlist_import::pipeline::{import, ImportOptions};
use playlist_import::progress::{create_progress_bar, format_duration, should_draw};
use playlist_import::spotify::SpotifyClient;

#[derive(Parser)]
#[command(name = "playlist-import")]
#[command(about = "Create a Spotify playlist from a folder of audio files or an m3u playlist")]
struct Args {
    /// Folder of audio files or m3u/m3u8 playlist
    input: PathBuf,

    /// Name of the new playlist
    output: String,

    /// Maximum number of matches added per input track
    #[arg(short = 'm', long = "maxmatches", default_value = "1",
          value_parser = clap::value_parser!(u8).range(1..=3))]
    max_matches: u8,

    /// Minimum match quality (10-100, in steps of 10)
    #[arg(short = 'q', long = "quality", default_value = "70", value_parser = parse_quality)]
    quality: u8,

    /// Only report the match rate, don't create a playlist
    #[arg(short = 'd', long = "dryrun")]
    dry_run: bool,

    /// Make the new playlist public
    #[arg(short = 'p', long)]
    public: bool,

    /// Log every lookup decision
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Also accept live and karaoke versions
    #[arg(short = 'a', long)]
    all: bool,

    /// Parallel lookups
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Credentials file (default: ./spotify_credentials.toml)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Write match statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn parse_quality(s: &str) -> std::result::Result<u8, String> {
    let value: u8 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (10..=100).contains(&value) && value % 10 == 0 {
        Ok(value)
    } else {
        Err("quality must be one of 10, 20, ..., 100".to_string())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let start = Instant::now();

    let names = require_track_names(&args.input)
        .with_context(|| format!("Failed to read input {:?}", args.input))?;
    info!("found {} input tracks", names.len());

    let creds = Credentials::load(args.credentials.as_deref()).context("Failed to load credentials")?;
    let client = SpotifyClient::connect(&creds)?;

    let options = ImportOptions {
        owner: &creds.username,
        playlist_name: &args.output,
        settings: MatchSettings {
            max_matches: args.max_matches as usize,
            min_quality: args.quality,
            versions: if args.all { VersionFilter::Allow } else { VersionFilter::Suppress },
        },
        workers: args.workers,
        public: args.public,
        dry_run: args.dry_run,
        stats_path: args.stats.as_deref(),
    };

    let pb = create_progress_bar(names.len() as u64, "Matching tracks", should_draw(args.verbose));
    let summary = import(&client, &names, &options, &pb)?;

    info!("finished in {}", format_duration(start.elapsed()));
    println!("{}", summary.message());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("70"), Ok(70));
        assert_eq!(parse_quality("10"), Ok(10));
        assert_eq!(parse_quality("100"), Ok(100));
        assert!(parse_quality("75").is_err());
        assert!(parse_quality("0").is_err());
        assert!(parse_quality("110").is_err());
        assert!(parse_quality("high").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["playlist-import", "music/", "Imported"]).unwrap();
        assert_eq!(args.max_matches, 1);
        assert_eq!(args.quality, 70);
        assert_eq!(args.workers, 1);
        assert!(!args.dry_run && !args.public && !args.all);
    }

    #[test]
    fn test_short_flags() {
        let args =
            Args::try_parse_from(["playlist-import", "-m", "3", "-q", "50", "-d", "-a", "list.m3u", "Mix"]).unwrap();
        assert_eq!(args.max_matches, 3);
        assert_eq!(args.quality, 50);
        assert!(args.dry_run && args.all);

        assert!(Args::try_parse_from(["playlist-import", "-m", "4", "list.m3u", "Mix"]).is_err());
    }
}
