//! Narrow interfaces to the streaming service.
//!
//! The pipeline only needs to search the catalog and, at the very end, write a
//! playlist. Both capabilities are traits so the core can run against an
//! in-memory catalog in tests.

use crate::error::Result;
use crate::models::CatalogMatch;

/// Most items the service accepts in a single add-to-playlist call
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

/// Catalog search capability.
/// `Sync` so lookups can be shared across worker threads.
pub trait TrackSearch: Sync {
    /// Free-text track search, no market restriction
    fn search_tracks(&self, query: &str, offset: usize, limit: usize)
        -> Result<Vec<CatalogMatch>>;
}

/// Newly created playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistHandle {
    pub id: String,
}

/// Playlist management capability
pub trait PlaylistWriter {
    fn create_playlist(&self, owner: &str, name: &str, public: bool) -> Result<PlaylistHandle>;

    /// Append tracks; callers send at most MAX_ITEMS_PER_REQUEST ids per call
    fn add_items(&self, playlist_id: &str, ids: &[String]) -> Result<()>;

    /// Number of entries the service reports for the playlist
    fn playlist_total(&self, playlist_id: &str) -> Result<usize>;
}
