//! Reelstore - versioned migration engine for video-editor project records.
//!
//! Project records live in named key-value stores and evolve through a chain
//! of schema versions, one step at a time. This crate provides:
//! - Per-record transform steps (v0 -> v1 scene synthesis, v1 -> v2 media
//!   embedding) that detect already-migrated data and skip it.
//! - Migration steps that drive a transform across every record in a store,
//!   isolating per-record failures.
//! - A runner that walks the registered steps from the store's recorded
//!   schema version upward, persisting progress after each clean step so an
//!   interrupted run can safely restart and deferred records are retried.
//! - Best-effort cleanup of legacy per-project timeline stores.
//!
//! The store itself is an external capability behind [`StoreBackend`];
//! [`MemoryBackend`] ships for tests and embedders, and a sled-backed
//! implementation is available behind the `sled` feature.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reelstore::{MigrationRunner, StoreNaming, V0ToV1Migration, V1ToV2Migration};
//!
//! let naming = StoreNaming::default();
//! let mut runner = MigrationRunner::new(Arc::clone(&backend), naming.clone());
//! runner.register(Box::new(V0ToV1Migration::new(Arc::clone(&backend), naming.clone())))?;
//! runner.register(Box::new(V1ToV2Migration::new(Arc::clone(&backend), naming)))?;
//! let version = runner.run().await?;
//! ```

pub mod migration;
pub mod record;
pub mod storage;

pub use migration::{
    CleanupExecutor, CleanupReport, MediaAssetLookup, Migration, MigrationError, MigrationResult,
    MigrationRunner, SkipReason, StepReport, TransformOptions, V0ToV1Migration, V1ToV2Migration,
};
pub use record::{ProjectRecord, Scene};
pub use storage::{MemoryBackend, StoreBackend, StoreError, StoreNaming};

#[cfg(feature = "sled")]
pub use storage::SledBackend;
