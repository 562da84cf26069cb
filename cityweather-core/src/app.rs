use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tracing::warn;

use crate::{
    config::Config,
    fetcher::ConditionsFetcher,
    model::UnitSystem,
    provider::client_from_config,
    recent::{FileRecentStore, MemoryRecentStore, RecentStore},
    resolver::PlaceResolver,
    session::{FetchRequest, Session},
};

/// Drives a [`Session`] with a resolver and a fetcher.
///
/// Network failures never escape these methods: they end up as the session's
/// error message, and the caller renders whatever the session holds.
#[derive(Debug)]
pub struct App {
    resolver: PlaceResolver,
    fetcher: ConditionsFetcher,
    session: Session,
}

impl App {
    pub fn new(resolver: PlaceResolver, fetcher: ConditionsFetcher, units: UnitSystem) -> Self {
        Self {
            resolver,
            fetcher,
            session: Session::new(units),
        }
    }

    /// Wire up the Open-Meteo client and the on-disk recent store from config.
    ///
    /// Without a platform data directory, recent searches live for this run only.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_store(config, recent_store(Config::data_dir()))
    }

    pub fn with_store(config: &Config, store: Arc<dyn RecentStore>) -> Result<Self> {
        let client = Arc::new(client_from_config(config)?);
        let resolver = PlaceResolver::new(client.clone(), store, config.recent_limit);
        let fetcher = ConditionsFetcher::new(client);
        Ok(Self::new(resolver, fetcher, config.units))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn resolver(&self) -> &PlaceResolver {
        &self.resolver
    }

    /// Run a search. Returns `false` when the text was blank and nothing happened.
    pub async fn search(&mut self, text: &str) -> bool {
        let Some(token) = self.session.begin_search(text) else {
            return false;
        };

        let outcome = self.resolver.resolve(text).await.map(|r| r.into_places());
        self.session.finish_search(token, outcome);
        true
    }

    /// Select a candidate and fetch its conditions. Returns `false` for an
    /// index that doesn't exist.
    pub async fn select(&mut self, index: usize) -> bool {
        match self.session.select(index) {
            Some(request) => {
                self.run_fetch(request).await;
                true
            }
            None => false,
        }
    }

    /// Change units, re-fetching the selected place if there is one.
    pub async fn set_units(&mut self, units: UnitSystem) {
        if let Some(request) = self.session.set_units(units) {
            self.run_fetch(request).await;
        }
    }

    async fn run_fetch(&mut self, request: FetchRequest) {
        let outcome = self.fetcher.fetch(&request.place, request.units).await;
        self.session.finish_fetch(request.token, outcome);
    }
}

fn recent_store(data_dir: Result<PathBuf>) -> Arc<dyn RecentStore> {
    match data_dir {
        Ok(dir) => Arc::new(FileRecentStore::in_dir(&dir)),
        Err(e) => {
            warn!("Recent searches will not be saved: {e:#}");
            Arc::new(MemoryRecentStore::new())
        }
    }
}
