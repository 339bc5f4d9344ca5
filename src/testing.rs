//! In-memory catalog for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::catalog::{PlaylistHandle, PlaylistWriter, TrackSearch};
use crate::error::{ImportError, Result};
use crate::models::CatalogMatch;

pub fn track(id: &str, artist: &str, title: &str, release_date: &str) -> CatalogMatch {
    CatalogMatch {
        id: id.to_string(),
        artist: artist.to_string(),
        title: title.to_string(),
        release_date: release_date.to_string(),
    }
}

/// Canned search responses keyed by exact query text; records every call
#[derive(Default)]
pub struct FakeCatalog {
    responses: HashMap<String, Vec<CatalogMatch>>,
    failing_queries: Vec<String>,
    pub searches: Mutex<Vec<(String, usize)>>,
    pub created: Mutex<Vec<(String, String, bool)>>,
    pub added: Mutex<Vec<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, query: &str, results: Vec<CatalogMatch>) -> Self {
        self.responses.insert(query.to_string(), results);
        self
    }

    pub fn with_failure(mut self, query: &str) -> Self {
        self.failing_queries.push(query.to_string());
        self
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }
}

impl TrackSearch for FakeCatalog {
    fn search_tracks(&self, query: &str, _offset: usize, limit: usize) -> Result<Vec<CatalogMatch>> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));

        if self.failing_queries.iter().any(|q| q == query) {
            return Err(ImportError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        let mut results = self.responses.get(query).cloned().unwrap_or_default();
        results.truncate(limit);
        Ok(results)
    }
}

impl PlaylistWriter for FakeCatalog {
    fn create_playlist(&self, owner: &str, name: &str, public: bool) -> Result<PlaylistHandle> {
        self.created
            .lock()
            .unwrap()
            .push((owner.to_string(), name.to_string(), public));
        Ok(PlaylistHandle {
            id: "fake-playlist".to_string(),
        })
    }

    fn add_items(&self, _playlist_id: &str, ids: &[String]) -> Result<()> {
        self.added.lock().unwrap().push(ids.to_vec());
        Ok(())
    }

    fn playlist_total(&self, _playlist_id: &str) -> Result<usize> {
        Ok(self.added.lock().unwrap().iter().map(Vec::len).sum())
    }
}
