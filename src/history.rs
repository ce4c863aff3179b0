//! Evaluation history and its key-value persistence.

pub use crate::error::HistoryError;
use chrono::Utc;
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Key the history array is stored under.
pub const HISTORY_KEY: &str = "omni_history";

/// Entries kept; older ones are evicted.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub expression: String,
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl HistoryItem {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expression: expression.into(),
            result: result.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// String key-value store the history persists into.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: String) -> Result<(), HistoryError>;
    fn remove(&self, key: &str) -> Result<(), HistoryError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Reads and writes the whole history as one JSON array under `HISTORY_KEY`.
pub struct HistoryStore {
    storage: Box<dyn Storage>,
}

impl HistoryStore {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Stored items, most recent first. Missing, unreadable or corrupt data
    /// all load as an empty history.
    pub fn load(&self) -> Vec<HistoryItem> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Discarding corrupt history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, items: &[HistoryItem]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(items)?;
        self.storage.set(HISTORY_KEY, json)
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        self.storage.remove(HISTORY_KEY)
    }
}

/// In-memory history backed by a `HistoryStore`. Every mutation rewrites the
/// stored list; if that write fails the in-memory change is kept and the
/// error returned.
pub struct History {
    items: Vec<HistoryItem>,
    store: HistoryStore,
}

impl History {
    /// Loads the stored history once.
    pub fn open(store: HistoryStore) -> Self {
        let mut items = store.load();
        items.truncate(MAX_HISTORY);
        debug!("loaded {} history items", items.len());
        Self { items, store }
    }

    /// Records a new entry at the front, evicting the oldest past `MAX_HISTORY`.
    pub fn record(
        &mut self,
        expression: impl Into<String>,
        result: impl Into<String>,
    ) -> Result<HistoryItem, HistoryError> {
        let item = HistoryItem::new(expression, result);
        self.push(item.clone())?;
        Ok(item)
    }

    pub fn push(&mut self, item: HistoryItem) -> Result<(), HistoryError> {
        self.items.insert(0, item);
        self.items.truncate(MAX_HISTORY);
        self.store.save(&self.items)
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.items.clear();
        self.store.clear()
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cloneable handle serializing all access to one `History`.
#[derive(Clone)]
pub struct SharedHistory(Arc<Mutex<History>>);

impl SharedHistory {
    pub fn new(history: History) -> Self {
        Self(Arc::new(Mutex::new(history)))
    }

    pub fn record(
        &self,
        expression: impl Into<String>,
        result: impl Into<String>,
    ) -> Result<HistoryItem, HistoryError> {
        self.0.lock().record(expression, result)
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        self.0.lock().clear()
    }

    /// Copy of the current items, most recent first.
    pub fn items(&self) -> Vec<HistoryItem> {
        self.0.lock().items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}
