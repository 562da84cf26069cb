//! Recently submitted search terms.

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::warn;

/// Key the list is stored under. Bump the suffix if the stored shape changes.
pub const RECENT_SEARCHES_KEY: &str = "recent_searches.v1";

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Persistence for the recent-searches list.
pub trait RecentStore: Send + Sync + Debug {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, entries: &[String]) -> Result<()>;
}

/// Put `term` first, dropping older entries that differ only by case and
/// anything beyond `limit`.
pub fn insert_recent(entries: &mut Vec<String>, term: &str, limit: usize) {
    let term = term.trim();
    if term.is_empty() {
        return;
    }

    let lowered = term.to_lowercase();
    entries.retain(|existing| existing.to_lowercase() != lowered);
    entries.insert(0, term.to_string());
    entries.truncate(limit);
}

/// JSON file holding a map of keys to string lists.
///
/// Only [`RECENT_SEARCHES_KEY`] is read or written; other keys in the file
/// are preserved.
#[derive(Debug, Clone)]
pub struct FileRecentStore {
    path: PathBuf,
}

impl FileRecentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `recent.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("recent.json"))
    }

    fn read_contents(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .with_context(|| format!("Failed to read recent searches: {}", self.path.display()))
    }

    fn parse_map(&self, contents: &str) -> Result<Map<String, Value>> {
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(contents)
            .with_context(|| format!("Failed to parse recent searches: {}", self.path.display()))
    }

    /// Write through a sibling temp file so a crash never leaves a half-written store.
    fn write_atomically(&self, json: &str) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write recent searches: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace recent searches: {}", self.path.display()))
    }
}

impl RecentStore for FileRecentStore {
    fn load(&self) -> Result<Vec<String>> {
        let Some(contents) = self.read_contents()? else {
            return Ok(Vec::new());
        };
        let map = self.parse_map(&contents)?;

        match map.get(RECENT_SEARCHES_KEY) {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).with_context(|| {
                format!("Unexpected shape under '{RECENT_SEARCHES_KEY}' in {}", self.path.display())
            }),
        }
    }

    /// Unparseable contents are replaced rather than blocking every save.
    fn save(&self, entries: &[String]) -> Result<()> {
        let contents = self.read_contents()?.unwrap_or_default();
        let mut map = self.parse_map(&contents).unwrap_or_else(|e| {
            warn!("Discarding unreadable recent searches: {e:#}");
            Map::new()
        });

        map.insert(
            RECENT_SEARCHES_KEY.to_string(),
            serde_json::to_value(entries).context("Failed to serialize recent searches")?,
        );

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&map).context("Failed to serialize recent searches")?;
        self.write_atomically(&json)
    }
}

/// In-process store, used by tests and when no data directory is available.
#[derive(Debug, Default)]
pub struct MemoryRecentStore {
    entries: Mutex<Vec<String>>,
}

impl MemoryRecentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecentStore for MemoryRecentStore {
    fn load(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("recent store lock poisoned"))?;
        Ok(entries.clone())
    }

    fn save(&self, new_entries: &[String]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("recent store lock poisoned"))?;
        *entries = new_entries.to_vec();
        Ok(())
    }
}
