//! Migration step bringing every project record from v0 to v1.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::MigrationError;
use super::result::MigrationResult;
use super::runner::{Migration, StepReport};
use super::transform::{transform_project_v0_to_v1, TransformOptions};
use crate::record::ProjectRecord;
use crate::storage::{StoreBackend, StoreNaming};

/// Synthesizes the initial scene for every sceneless project record.
///
/// Records are processed strictly sequentially in store enumeration order.
/// Malformed or id-less records are logged and skipped; a record whose
/// write fails is reported as deferred so the runner holds the recorded
/// version back and the record is retried on the next run. Only an
/// enumeration failure aborts the step.
pub struct V0ToV1Migration {
    backend: Arc<dyn StoreBackend>,
    naming: StoreNaming,
}

impl V0ToV1Migration {
    pub fn new(backend: Arc<dyn StoreBackend>, naming: StoreNaming) -> Self {
        Self { backend, naming }
    }
}

#[async_trait]
impl Migration for V0ToV1Migration {
    fn from_version(&self) -> u32 {
        0
    }

    fn to_version(&self) -> u32 {
        1
    }

    async fn run(&self) -> Result<StepReport, MigrationError> {
        let store = self.naming.projects.as_str();
        let records =
            self.backend
                .get_all(store)
                .await
                .map_err(|source| MigrationError::Enumeration {
                    store: store.to_owned(),
                    source,
                })?;

        let mut report = StepReport::default();
        for value in records {
            let record = match ProjectRecord::from_value(value) {
                Ok(record) => record,
                Err(err) => {
                    warn!(store, error = %err, "skipping malformed project record");
                    continue;
                }
            };

            let Some(project_id) = record.project_id().map(str::to_owned) else {
                debug!(store, "skipping project record without a resolvable id");
                continue;
            };

            let result = transform_project_v0_to_v1(record, &TransformOptions::default());
            let MigrationResult::Migrated(migrated) = result else {
                continue;
            };

            let value = match migrated.to_value() {
                Ok(value) => value,
                Err(err) => {
                    warn!(project_id = %project_id, error = %err, "failed to serialize migrated record");
                    report.deferred += 1;
                    continue;
                }
            };
            if let Err(err) = self.backend.set(store, &project_id, value).await {
                // The record stays at v0; deferring it keeps the recorded
                // version back so the next run retries.
                warn!(store, project_id = %project_id, error = %err, "failed to persist migrated record");
                report.deferred += 1;
            }
        }

        Ok(report)
    }
}
