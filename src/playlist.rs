//! Creating and filling the output playlist.

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::catalog::{PlaylistWriter, MAX_ITEMS_PER_REQUEST};
use crate::error::Result;

/// Playlist that was created and filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPlaylist {
    pub id: String,
    pub name: String,
    pub total: usize,
}

/// Playlist name stamped with the creation time, so repeated imports
/// don't produce identically named playlists
pub fn playlist_title<Tz: TimeZone>(name: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} from {}", name, now.format("%Y-%m-%d %H:%M:%S%z"))
}

/// Create a new playlist and add all ids to it, at most
/// MAX_ITEMS_PER_REQUEST per call. Returns the total the service reports.
pub fn publish_playlist<W: PlaylistWriter + ?Sized>(
    writer: &W,
    owner: &str,
    name: &str,
    ids: &[String],
    public: bool,
) -> Result<PublishedPlaylist> {
    let full_name = playlist_title(name, &Local::now());
    let playlist = writer.create_playlist(owner, &full_name, public)?;
    info!("created playlist \"{}\" ({})", full_name, playlist.id);

    for chunk in ids.chunks(MAX_ITEMS_PER_REQUEST) {
        writer.add_items(&playlist.id, chunk)?;
    }

    let total = writer.playlist_total(&playlist.id)?;
    Ok(PublishedPlaylist {
        id: playlist.id,
        name: full_name,
        total,
    })
}
