//! Named key-value store access consumed by the migration engine.
//!
//! The engine never owns the store: it talks to whatever backend the
//! application provides through [`StoreBackend`]. Values are JSON documents.

pub mod config;
pub mod memory;
#[cfg(feature = "sled")]
pub mod sled;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use config::StoreNaming;
pub use memory::MemoryBackend;
#[cfg(feature = "sled")]
pub use self::sled::SledBackend;

/// Errors reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying backend reported a failure.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A persisted value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value access to named stores.
///
/// A "store" is a flat namespace of JSON values; the engine addresses stores
/// by name (see [`StoreNaming`]) and never assumes anything about how the
/// backend maps names to physical storage.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Reads one value, or reports absence.
    async fn get(&self, store: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Lists every value in the store. The order is unspecified but must be
    /// stable within one migration run.
    async fn get_all(&self, store: &str) -> Result<Vec<Value>, StoreError>;

    /// Writes one value under a key, replacing any previous value.
    async fn set(&self, store: &str, key: &str, value: Value) -> Result<(), StoreError>;

    /// Deletes an entire named store. Deleting a store that does not exist
    /// is not an error.
    async fn delete_store(&self, store: &str) -> Result<(), StoreError>;
}
