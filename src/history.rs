//! Watched-episode tracking for episode-browser.
//!
//! Each series keeps the episodes the user has opened. The store holds a
//! nested map under `watched-episodes` (series id to episode array) and a
//! flat per-series copy under `watched-episodes-<series id>`.

use crate::storage::{KeyValueStore, read_best_effort, write_best_effort};
use crate::types::Episode;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store key of the nested map of every series.
pub const WATCHED_KEY: &str = "watched-episodes";

/// Store key of the flat snapshot for one series.
pub fn series_key(series_id: &str) -> String {
    format!("{}-{}", WATCHED_KEY, series_id)
}

/// Episodes watched within one series, in the order they were watched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchedSet {
    episodes: Vec<Episode>,
}

impl WatchedSet {
    /// Create a new empty watched set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an episode unless one with the same id is already present.
    ///
    /// Returns whether the set changed.
    pub fn insert(&mut self, episode: Episode) -> bool {
        if self.contains(&episode.id) {
            return false;
        }
        self.episodes.push(episode);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.episodes.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }
}

impl From<Vec<Episode>> for WatchedSet {
    fn from(episodes: Vec<Episode>) -> Self {
        let mut set = WatchedSet::new();
        for episode in episodes {
            set.insert(episode);
        }
        set
    }
}

/// Typed access to watched sets in a key-value store.
pub struct WatchedRepository<'a> {
    store: &'a mut dyn KeyValueStore,
}

impl<'a> WatchedRepository<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Load the watched set of a series.
    ///
    /// Reads the nested map first and falls back to the flat snapshot.
    /// Missing or malformed data yields an empty set.
    pub fn get(&self, series_id: &str) -> WatchedSet {
        let nested = self
            .load_map()
            .get(series_id)
            .and_then(|value| serde_json::from_value::<Vec<Episode>>(value.clone()).ok());

        if let Some(episodes) = nested {
            return WatchedSet::from(episodes);
        }

        read_best_effort(&*self.store, &series_key(series_id))
            .and_then(|raw| serde_json::from_str::<Vec<Episode>>(&raw).ok())
            .map(WatchedSet::from)
            .unwrap_or_default()
    }

    /// Save the watched set of a series.
    ///
    /// Other series in the nested map are kept as they are.
    pub fn put(&mut self, series_id: &str, watched: &WatchedSet) {
        let value = match serde_json::to_value(watched) {
            Ok(value) => value,
            Err(e) => {
                debug!("Could not encode watched set for {}: {}", series_id, e);
                return;
            }
        };

        let mut map = self.load_map();
        map.insert(series_id.to_string(), value.clone());

        write_best_effort(self.store, WATCHED_KEY, &Value::Object(map).to_string());
        write_best_effort(self.store, &series_key(series_id), &value.to_string());
    }

    fn load_map(&self) -> Map<String, Value> {
        match read_best_effort(&*self.store, WATCHED_KEY)
            .map(|raw| serde_json::from_str::<Value>(&raw))
        {
            Some(Ok(Value::Object(map))) => map,
            Some(_) => {
                debug!("Resetting malformed '{}' entry", WATCHED_KEY);
                Map::new()
            }
            None => Map::new(),
        }
    }
}
