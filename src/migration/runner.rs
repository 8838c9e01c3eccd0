//! Migration registry and runner.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::error::MigrationError;
use crate::storage::{StoreBackend, StoreNaming};

/// Outcome of one migration step pass.
///
/// `deferred` counts records a transient per-record failure (a read, lookup,
/// or write that errored) left at their old version. The runner refuses to
/// advance the recorded schema version past a pass that deferred records, so
/// the next run walks the step again and retries them. Policy skips
/// (malformed shape, missing identifier, already-migrated records) are not
/// deferrals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Records left behind for the next run.
    pub deferred: usize,
}

/// One registered step bringing every record of the store from one schema
/// version to the next.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Schema version this step upgrades from.
    fn from_version(&self) -> u32;
    /// Schema version this step upgrades to.
    fn to_version(&self) -> u32;
    /// Drives the step across every record in the store.
    async fn run(&self) -> Result<StepReport, MigrationError>;
}

/// Ordered registry of migration steps plus recorded-version bookkeeping.
///
/// Steps form a strategy table keyed by their `from` version. `run` walks
/// the table from the store's recorded version until no step applies. The
/// recorded version advances only while every pass so far came back clean:
/// once a step defers a record, the version is held back so the next run
/// re-walks from that step and retries, while the per-transform idempotence
/// checks make re-visiting already-migrated records harmless.
pub struct MigrationRunner {
    backend: Arc<dyn StoreBackend>,
    naming: StoreNaming,
    steps: BTreeMap<u32, Box<dyn Migration>>,
}

impl MigrationRunner {
    pub fn new(backend: Arc<dyn StoreBackend>, naming: StoreNaming) -> Self {
        Self {
            backend,
            naming,
            steps: BTreeMap::new(),
        }
    }

    /// Registers a step. A step must strictly increase the version, and at
    /// most one step may leave from any given version. Gaps between
    /// registered steps are not rejected here; the runner simply stops
    /// walking when it reaches one.
    pub fn register(&mut self, step: Box<dyn Migration>) -> Result<(), MigrationError> {
        let (from, to) = (step.from_version(), step.to_version());
        if to <= from {
            return Err(MigrationError::InvalidRegistry {
                message: format!("step v{from} -> v{to} does not increase the version"),
            });
        }
        if self.steps.contains_key(&from) {
            return Err(MigrationError::InvalidRegistry {
                message: format!("duplicate step leaving from version {from}"),
            });
        }
        self.steps.insert(from, step);
        Ok(())
    }

    /// Applies every step whose `from` matches the recorded version, in
    /// ascending order, and returns the version the walk reached. When a
    /// step defers records the recorded version lags behind the returned
    /// one; the next run resumes from the recorded version and retries.
    pub async fn run(&self) -> Result<u32, MigrationError> {
        let mut current = self.recorded_version().await?;
        let mut clean = true;
        while let Some(step) = self.steps.get(&current) {
            let (from, to) = (step.from_version(), step.to_version());
            info!(from, to, store = %self.naming.projects, "running migration step");
            let report = step
                .run()
                .await
                .map_err(|source| MigrationError::Step {
                    from,
                    to,
                    source: Box::new(source),
                })?;
            if report.deferred > 0 {
                clean = false;
                warn!(
                    from,
                    to,
                    deferred = report.deferred,
                    "records deferred, recorded version held back for retry"
                );
            }
            if clean {
                self.record_version(to).await?;
            }
            current = to;
        }
        Ok(current)
    }

    /// The schema version currently recorded in the meta store. An absent or
    /// unreadable value means version 0.
    pub async fn recorded_version(&self) -> Result<u32, MigrationError> {
        let value = self
            .backend
            .get(&self.naming.meta, StoreNaming::SCHEMA_VERSION_KEY)
            .await
            .map_err(|source| MigrationError::VersionStore { source })?;
        // A non-numeric or out-of-range meta value reads as 0 rather than
        // some truncated version.
        Ok(value
            .and_then(|value| value.as_u64())
            .and_then(|version| u32::try_from(version).ok())
            .unwrap_or(0))
    }

    async fn record_version(&self, version: u32) -> Result<(), MigrationError> {
        self.backend
            .set(
                &self.naming.meta,
                StoreNaming::SCHEMA_VERSION_KEY,
                Value::from(version),
            )
            .await
            .map_err(|source| MigrationError::VersionStore { source })
    }
}
