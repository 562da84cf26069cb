use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::NetworkError,
    model::Place,
    provider::PlaceLookup,
    query::{self, filter_candidates, parse_query},
    recent::{RecentStore, insert_recent},
};

/// Outcome of a resolve call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Blank input: no request was sent.
    Skipped,
    /// A search ran; the list may be empty.
    Completed(Vec<Place>),
}

impl Resolution {
    pub fn into_places(self) -> Vec<Place> {
        match self {
            Resolution::Skipped => Vec::new(),
            Resolution::Completed(places) => places,
        }
    }
}

/// Turns free-text search input into candidate places and records
/// successful searches.
#[derive(Debug, Clone)]
pub struct PlaceResolver {
    lookup: Arc<dyn PlaceLookup>,
    store: Arc<dyn RecentStore>,
    recent_limit: usize,
}

impl PlaceResolver {
    pub fn new(
        lookup: Arc<dyn PlaceLookup>,
        store: Arc<dyn RecentStore>,
        recent_limit: usize,
    ) -> Self {
        Self {
            lookup,
            store,
            recent_limit,
        }
    }

    pub async fn resolve(&self, text: &str) -> Result<Resolution, NetworkError> {
        if query::is_blank(text) {
            debug!("ignoring blank search");
            return Ok(Resolution::Skipped);
        }

        let parsed = parse_query(text);
        debug!(name = %parsed.name, country = ?parsed.country, "resolving place");

        let raw = self.lookup.search(&parsed.name).await?;
        let raw_count = raw.len();
        let places = filter_candidates(raw, parsed.country.as_deref());

        info!(
            "Found {} candidate(s) for '{}' ({} before filtering)",
            places.len(),
            text.trim(),
            raw_count
        );

        self.remember(text);

        Ok(Resolution::Completed(places))
    }

    /// Recent searches, newest first. Store failures read as an empty list.
    pub fn recent(&self) -> Vec<String> {
        self.store.load().unwrap_or_else(|e| {
            warn!("Could not load recent searches: {e:#}");
            Vec::new()
        })
    }

    pub fn clear_recent(&self) -> anyhow::Result<()> {
        self.store.save(&[])
    }

    fn remember(&self, text: &str) {
        let mut entries = self.recent();
        insert_recent(&mut entries, text, self.recent_limit);

        if let Err(e) = self.store.save(&entries) {
            warn!("Could not save recent searches: {e:#}");
        }
    }
}
