//! sled-backed store backend, one tree per named store.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::{StoreBackend, StoreError};

/// Native persistence over a sled database. Each named store maps to a sled
/// tree; values are stored as JSON bytes.
pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    /// Wraps an already-open database.
    pub fn new(db: sled::Db) -> Self {
        Self { db }
    }

    /// Opens (or creates) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(to_store_error)?;
        Ok(Self { db })
    }

    fn tree(&self, store: &str) -> Result<sled::Tree, StoreError> {
        self.db.open_tree(store).map_err(to_store_error)
    }
}

fn to_store_error(err: sled::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl StoreBackend for SledBackend {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let tree = self.tree(store)?;
        match tree.get(key).map_err(to_store_error)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Value>, StoreError> {
        let tree = self.tree(store)?;
        let mut values = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (_, bytes) = entry.map_err(to_store_error)?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }

    async fn set(&self, store: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let tree = self.tree(store)?;
        let bytes = serde_json::to_vec(&value)?;
        tree.insert(key, bytes).map_err(to_store_error)?;
        Ok(())
    }

    async fn delete_store(&self, store: &str) -> Result<(), StoreError> {
        // drop_tree returns Ok(false) for a tree that never existed.
        self.db.drop_tree(store).map_err(to_store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_backend() -> SledBackend {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledBackend::new(db)
    }

    #[tokio::test]
    async fn test_roundtrip_through_trees() {
        let backend = temp_backend();
        backend.set("projects", "p1", json!({"id": "p1"})).await.unwrap();
        assert_eq!(
            backend.get("projects", "p1").await.unwrap(),
            Some(json!({"id": "p1"}))
        );
        assert_eq!(
            backend.get_all("projects").await.unwrap(),
            vec![json!({"id": "p1"})]
        );
    }

    #[tokio::test]
    async fn test_delete_store_tolerates_missing_tree() {
        let backend = temp_backend();
        backend.delete_store("never-created").await.unwrap();

        backend.set("projects", "p1", json!(1)).await.unwrap();
        backend.delete_store("projects").await.unwrap();
        assert!(backend.get_all("projects").await.unwrap().is_empty());
    }
}
