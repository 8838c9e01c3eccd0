//! In-process store backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{StoreBackend, StoreError};

/// An in-memory backend for tests and embedders without native storage.
///
/// Enumeration returns values in key order, which keeps iteration
/// deterministic across runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stores: DashMap<String, BTreeMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a named store currently exists.
    pub fn contains_store(&self, store: &str) -> bool {
        self.stores.contains_key(store)
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .stores
            .get(store)
            .and_then(|tree| tree.get(key).cloned()))
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .stores
            .get(store)
            .map(|tree| tree.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn set(&self, store: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.stores
            .entry(store.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete_store(&self, store: &str) -> Result<(), StoreError> {
        self.stores.remove(store);
        Ok(())
    }
}
