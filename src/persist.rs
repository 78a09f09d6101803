// Persistence bridge between the list state and a key-value store

use crate::kv::KeyValueStore;
use crate::models::Todo;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// Key the item collection is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "todos";

/// Mirrors the item collection into a [`KeyValueStore`]
///
/// Writes are suppressed until [`Persistence::hydrate`] has run, so the empty
/// initial state can never overwrite data that has not been loaded yet.
pub struct Persistence<S: KeyValueStore> {
    store: S,
    key: String,
    hydrated: bool,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            hydrated: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored collection and enable writes
    ///
    /// Never fails: a missing value, an unreadable store or a value that does
    /// not parse as a list of items all yield an empty collection.
    pub fn hydrate(&mut self) -> Vec<Todo> {
        let items = match self.store.get(&self.key) {
            Ok(Some(raw)) => parse_items(&raw).unwrap_or_else(|e| {
                warn!(key = %self.key, error = ?e, "Discarding unreadable saved todos");
                Vec::new()
            }),
            Ok(None) => {
                debug!(key = %self.key, "No saved todos");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = ?e, "Failed to read saved todos");
                Vec::new()
            }
        };

        self.hydrated = true;
        info!(key = %self.key, count = items.len(), "Hydrated todos");
        items
    }

    /// Write the full collection, returning `false` when suppressed before hydration
    pub fn save(&mut self, items: &[Todo]) -> Result<bool> {
        if !self.hydrated {
            debug!(key = %self.key, "save: suppressed before hydration");
            return Ok(false);
        }

        let json = serialize_items(items)?;
        self.store
            .set(&self.key, &json)
            .with_context(|| format!("Failed to save todos under key {:?}", self.key))?;
        debug!(key = %self.key, count = items.len(), "Saved todos");
        Ok(true)
    }
}

/// Parse a stored value, defaulting missing priorities to medium
pub fn parse_items(raw: &str) -> Result<Vec<Todo>> {
    serde_json::from_str(raw).context("Failed to parse saved todos")
}

/// Compact JSON with field order `id, text, completed, priority`
pub fn serialize_items(items: &[Todo]) -> Result<String> {
    serde_json::to_string(items).context("Failed to serialize todos")
}
