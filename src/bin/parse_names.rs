//! Show how input filenames are parsed, without contacting Spotify.
//!
//! Usage: parse-names <folder-or-m3u> [--failures-only]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use playlist_import::input::load_track_names;
use playlist_import::normalize::{normalize_track_name, parse_track_name};

#[derive(Parser)]
#[command(name = "parse-names")]
#[command(about = "Print the artist/title parse of every input track name")]
struct Args {
    /// Folder of audio files or m3u/m3u8 playlist
    input: PathBuf,

    /// Only list names that could not be parsed
    #[arg(long)]
    failures_only: bool,
}

fn main() -> Result<()> {
    // Parse failures are reported in the table, not as log lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let names = load_track_names(&args.input)
        .with_context(|| format!("Failed to read input {:?}", args.input))?;

    println!("Parsing {} track names from {:?}\n", names.len(), args.input);

    let mut failures = 0usize;
    for name in &names {
        match parse_track_name(name) {
            Some(parsed) => {
                if !args.failures_only {
                    println!("  ok    {}", name);
                    println!("        artist: {}", parsed.artist);
                    println!("        title:  {}", parsed.title);
                    if !parsed.title_extra.is_empty() {
                        println!("        extra:  {}", parsed.title_extra);
                    }
                }
            }
            None => {
                failures += 1;
                println!("  FAIL  {}", name);
                println!("        normalized: {}", normalize_track_name(name));
            }
        }
    }

    let rate = if names.is_empty() {
        0.0
    } else {
        100.0 * failures as f64 / names.len() as f64
    };

    println!("\n{:=<60}", "");
    println!("  Names:          {}", names.len());
    println!("  Parsed:         {}", names.len() - failures);
    println!("  Parse failures: {} ({:.2}%)", failures, rate);
    println!("{:=<60}", "");

    Ok(())
}
