//! Input track names from a folder or an m3u playlist.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::{ImportError, Result};

/// File stem of a path-like string, accepting Windows separators
fn stem_of(entry: &str) -> Option<String> {
    let unified = entry.replace('\\', "/");
    Path::new(&unified)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Track names from the files in a folder, oldest first.
/// Hidden files and subdirectories are skipped.
pub fn tracks_from_folder(dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<(SystemTime, String)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if let Some(stem) = stem_of(&name) {
            files.push((modified, stem));
        }
    }

    files.sort();
    debug!("found {} files in {}", files.len(), dir.display());
    Ok(files.into_iter().map(|(_, stem)| stem).collect())
}

/// Track names from the entries of an m3u/m3u8 playlist.
/// Comment and directive lines (`#EXTM3U`, `#EXTINF:...`) are skipped.
pub fn tracks_from_playlist(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);

    let tracks: Vec<String> = content
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(stem_of)
        .collect();

    debug!("found {} entries in {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Track names from whatever `input` points at.
/// Anything that is neither a file nor a folder yields no tracks.
pub fn load_track_names(input: &Path) -> Result<Vec<String>> {
    if input.is_file() {
        tracks_from_playlist(input)
    } else if input.is_dir() {
        tracks_from_folder(input)
    } else {
        warn!("input {} is neither a file nor a folder", input.display());
        Ok(Vec::new())
    }
}

/// Like [`load_track_names`], but finding no tracks is an error
pub fn require_track_names(input: &Path) -> Result<Vec<String>> {
    let names = load_track_names(input)?;
    if names.is_empty() {
        return Err(ImportError::EmptyInput(input.to_path_buf()));
    }
    Ok(names)
}
