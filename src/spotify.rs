//! Spotify Web API client.
//!
//! Implements catalog search and playlist management on top of a blocking
//! ureq agent. Authorization is handled by [`crate::auth`].

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth;
use crate::catalog::{PlaylistHandle, PlaylistWriter, TrackSearch, MAX_ITEMS_PER_REQUEST};
use crate::config::Credentials;
use crate::error::{ImportError, Result};
use crate::models::CatalogMatch;

pub const API_BASE: &str = "https://api.spotify.com/v1";

const USER_AGENT: &str = concat!("playlist-import/", env!("CARGO_PKG_VERSION"));

/// Spotify caps search pages at 50 results
const MAX_SEARCH_LIMIT: usize = 50;

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    tracks: ApiTrackPage,
}

#[derive(Debug, Deserialize)]
struct ApiTrackPage {
    // Spotify occasionally returns null entries
    #[serde(default)]
    items: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistTracks {
    total: usize,
}

impl ApiTrack {
    /// Local files have no catalog id and can't be added to a playlist
    fn into_match(self) -> Option<CatalogMatch> {
        let id = self.id?;
        Some(CatalogMatch {
            id,
            artist: self
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            title: self.name,
            release_date: self.album.and_then(|a| a.release_date).unwrap_or_default(),
        })
    }
}

fn matches_from_search(response: ApiSearchResponse) -> Vec<CatalogMatch> {
    response
        .tracks
        .items
        .into_iter()
        .flatten()
        .filter_map(ApiTrack::into_match)
        .collect()
}

/// Track id to the URI form the playlist endpoints expect
pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

// ============================================================================
// Client
// ============================================================================

/// Authorized Spotify client
pub struct SpotifyClient {
    agent: ureq::Agent,
    access_token: String,
}

fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(20))
        .user_agent(USER_AGENT)
        .build()
}

impl SpotifyClient {
    /// Client for an already obtained access token
    pub fn new(access_token: &str) -> Self {
        Self {
            agent: build_agent(),
            access_token: access_token.to_string(),
        }
    }

    /// Authorize with the given credentials (cached token or interactive flow)
    pub fn connect(creds: &Credentials) -> Result<Self> {
        let agent = build_agent();
        let access_token = auth::authenticate(&agent, creds)?;
        Ok(Self { agent, access_token })
    }

    /// API url with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| ImportError::Config(format!("invalid api base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ImportError::Config(format!("api base url cannot have a path: {}", API_BASE)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        self.agent
            .request_url(method, url)
            .set("Authorization", &format!("Bearer {}", self.access_token))
    }
}

impl TrackSearch for SpotifyClient {
    fn search_tracks(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<CatalogMatch>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.clamp(1, MAX_SEARCH_LIMIT).to_string());

        debug!("searching spotify for \"{}\"", query);
        let response: ApiSearchResponse = self.request("GET", &url).call()?.into_json()?;
        Ok(matches_from_search(response))
    }
}

impl PlaylistWriter for SpotifyClient {
    fn create_playlist(&self, owner: &str, name: &str, public: bool) -> Result<PlaylistHandle> {
        let url = self.endpoint(&["users", owner, "playlists"])?;
        let playlist: ApiPlaylist = self
            .request("POST", &url)
            .send_json(json!({ "name": name, "public": public }))?
            .into_json()?;
        Ok(PlaylistHandle { id: playlist.id })
    }

    fn add_items(&self, playlist_id: &str, ids: &[String]) -> Result<()> {
        if ids.len() > MAX_ITEMS_PER_REQUEST {
            return Err(ImportError::Config(format!(
                "cannot add {} items in one request (max {})",
                ids.len(),
                MAX_ITEMS_PER_REQUEST
            )));
        }

        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let uris: Vec<String> = ids.iter().map(|id| track_uri(id)).collect();
        self.request("POST", &url)
            .send_json(json!({ "uris": uris }))?;
        debug!("added {} tracks to playlist {}", ids.len(), playlist_id);
        Ok(())
    }

    fn playlist_total(&self, playlist_id: &str) -> Result<usize> {
        let mut url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        url.query_pairs_mut()
            .append_pair("fields", "total")
            .append_pair("limit", "1");

        let page: ApiPlaylistTracks = self.request("GET", &url).call()?.into_json()?;
        Ok(page.total)
    }
}
