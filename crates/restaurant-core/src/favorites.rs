//! Favorite restaurants kept in simple local storage.
//!
//! Simple storage is a flat string-to-string map, the way a browser's
//! `localStorage` is. Favorites live under one key as a JSON array of
//! restaurant ids and have no server counterpart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Key holding the JSON-encoded favorites array
pub const FAVORITES_KEY: &str = "favorites";

/// Flat string key-value storage
pub trait SimpleStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Simple storage persisted as one JSON object file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl SimpleStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::LocalStore("storage lock poisoned".to_string()))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::LocalStore("storage lock poisoned".to_string()))?;
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }
}

/// Simple storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimpleStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| Error::LocalStore("storage lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .map_err(|_| Error::LocalStore("storage lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The favorites set on top of simple storage
pub struct Favorites {
    storage: Box<dyn SimpleStorage>,
}

impl Favorites {
    pub fn new(storage: impl SimpleStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Favorites kept in memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Favorited restaurant ids in the order they were added.
    pub fn list(&self) -> Result<Vec<i64>> {
        let Some(raw) = self.storage.get_item(FAVORITES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(error) => {
                tracing::warn!("Ignoring unreadable favorites value: {error}");
                Ok(Vec::new())
            }
        }
    }

    /// Whether `restaurant_id` is a favorite; unreadable storage counts as no.
    pub fn contains(&self, restaurant_id: i64) -> bool {
        match self.list() {
            Ok(ids) => ids.contains(&restaurant_id),
            Err(error) => {
                tracing::warn!("Failed to read favorites: {error}");
                false
            }
        }
    }

    /// Flip membership of `restaurant_id`; returns whether it is now a favorite.
    pub fn toggle(&self, restaurant_id: i64) -> Result<bool> {
        let mut ids = self.list()?;
        let now_favorite = if let Some(position) = ids.iter().position(|id| *id == restaurant_id) {
            ids.remove(position);
            false
        } else {
            ids.push(restaurant_id);
            true
        };

        self.storage
            .set_item(FAVORITES_KEY, &serde_json::to_string(&ids)?)?;
        Ok(now_favorite)
    }
}
