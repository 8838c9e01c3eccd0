//! Migration step embedding media metadata and retiring legacy stores.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::cleanup::CleanupExecutor;
use super::error::MigrationError;
use super::result::MigrationResult;
use super::runner::{Migration, StepReport};
use super::transform::{transform_project_v1_to_v2, MediaAssetLookup, TransformOptions};
use crate::record::ProjectRecord;
use crate::storage::{StoreBackend, StoreError, StoreNaming};

/// Embeds media asset metadata into every v1 record, then retires that
/// record's legacy timeline stores.
///
/// Records are processed strictly sequentially in store enumeration order.
/// Records still below v1 are left for the scene-synthesis step; records
/// whose lookup or write failed are reported as deferred and retried on the
/// next run. Cleanup for a record only runs after that record's own write
/// succeeded: an interrupted run never deletes a store whose data was not
/// migrated.
pub struct V1ToV2Migration {
    backend: Arc<dyn StoreBackend>,
    naming: StoreNaming,
}

/// Lookup reading the per-project media store, constructed once per record.
struct StoreMediaAssetLookup {
    backend: Arc<dyn StoreBackend>,
    store: String,
}

#[async_trait]
impl MediaAssetLookup for StoreMediaAssetLookup {
    async fn load(&self, media_id: &str) -> Result<Option<Value>, StoreError> {
        self.backend.get(&self.store, media_id).await
    }
}

impl V1ToV2Migration {
    pub fn new(backend: Arc<dyn StoreBackend>, naming: StoreNaming) -> Self {
        Self { backend, naming }
    }

    fn media_lookup(&self, project_id: &str) -> StoreMediaAssetLookup {
        StoreMediaAssetLookup {
            backend: Arc::clone(&self.backend),
            store: self.naming.media_store(project_id),
        }
    }
}

#[async_trait]
impl Migration for V1ToV2Migration {
    fn from_version(&self) -> u32 {
        1
    }

    fn to_version(&self) -> u32 {
        2
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

        let cleanup = CleanupExecutor::new(Arc::clone(&self.backend), self.naming.clone());

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

            let lookup = self.media_lookup(&project_id);
            let result =
                match transform_project_v1_to_v2(record, &lookup, &TransformOptions::default())
                    .await
                {
                    Ok(result) => result,
                    Err(err) => {
                        // Left at v1, retried on the next run.
                        warn!(store, project_id = %project_id, error = %err, "media lookup failed for record");
                        report.deferred += 1;
                        continue;
                    }
                };
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
                warn!(store, project_id = %project_id, error = %err, "failed to persist migrated record");
                report.deferred += 1;
                continue;
            }

            let cleanup_report = cleanup
                .remove_legacy_timeline_stores(&project_id, &migrated)
                .await;
            if cleanup_report.failed > 0 {
                debug!(project_id = %project_id, failed = cleanup_report.failed, "some legacy stores were left behind");
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use serde_json::json;

    fn v1_project(id: &str, media_id: &str) -> Value {
        json!({
            "id": id,
            "version": 1,
            "scenes": [{
                "id": "s1",
                "tracks": [{"clips": [{"id": "c1", "mediaId": media_id}]}]
            }]
        })
    }

    async fn backend_with_project() -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::new());
        let naming = StoreNaming::default();
        backend
            .set(&naming.projects, "p1", v1_project("p1", "m1"))
            .await
            .unwrap();
        backend
            .set(&naming.media_store("p1"), "m1", json!({"name": "take.mp4"}))
            .await
            .unwrap();
        backend
            .set(&naming.scene_timelines_store("p1", "s1"), "t", json!(1))
            .await
            .unwrap();
        backend
            .set(&naming.project_timelines_store("p1"), "t", json!(1))
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn test_migrates_record_and_retires_legacy_stores() {
        let backend = backend_with_project().await;
        let step = V1ToV2Migration::new(backend.clone(), StoreNaming::default());
        step.run().await.unwrap();

        let stored = backend
            .get("video-editor-projects", "p1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["version"], json!(2));
        assert_eq!(
            stored["scenes"][0]["tracks"][0]["clips"][0]["media"],
            json!({"name": "take.mp4"})
        );
        assert!(!backend.contains_store("video-editor-timelines-p1-s1"));
        assert!(!backend.contains_store("video-editor-timelines-p1"));
    }

    #[tokio::test]
    async fn test_skipped_record_keeps_its_legacy_stores() {
        let backend = Arc::new(MemoryBackend::new());
        let naming = StoreNaming::default();
        backend
            .set(&naming.projects, "p1", json!({"id": "p1", "version": 2, "scenes": [{"id": "s1"}]}))
            .await
            .unwrap();
        backend
            .set(&naming.scene_timelines_store("p1", "s1"), "t", json!(1))
            .await
            .unwrap();

        let step = V1ToV2Migration::new(backend.clone(), naming);
        step.run().await.unwrap();

        // No write, therefore no cleanup either.
        assert!(backend.contains_store("video-editor-timelines-p1-s1"));
    }

    #[tokio::test]
    async fn test_v0_record_is_left_for_the_scene_synthesis_step() {
        let backend = Arc::new(MemoryBackend::new());
        let naming = StoreNaming::default();
        backend
            .set(&naming.projects, "p1", json!({"id": "p1", "version": 0}))
            .await
            .unwrap();
        backend
            .set(&naming.project_timelines_store("p1"), "t", json!(1))
            .await
            .unwrap();

        let step = V1ToV2Migration::new(backend.clone(), naming.clone());
        let report = step.run().await.unwrap();
        assert_eq!(report.deferred, 0);

        // No v2 stamp without the scene structure v1 introduces, and no
        // cleanup for a record that was not migrated.
        assert_eq!(
            backend.get(&naming.projects, "p1").await.unwrap(),
            Some(json!({"id": "p1", "version": 0}))
        );
        assert!(backend.contains_store("video-editor-timelines-p1"));
    }

    #[tokio::test]
    async fn test_record_without_identifier_is_skipped() {
        let backend = Arc::new(MemoryBackend::new());
        let naming = StoreNaming::default();
        backend
            .set(&naming.projects, "orphan", json!({"version": 1}))
            .await
            .unwrap();

        let step = V1ToV2Migration::new(backend.clone(), naming);
        step.run().await.unwrap();

        assert_eq!(
            backend.get("video-editor-projects", "orphan").await.unwrap(),
            Some(json!({"version": 1}))
        );
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let backend = backend_with_project().await;
        let step = V1ToV2Migration::new(backend.clone(), StoreNaming::default());
        step.run().await.unwrap();
        let first = backend.get("video-editor-projects", "p1").await.unwrap();
        step.run().await.unwrap();
        let second = backend.get("video-editor-projects", "p1").await.unwrap();
        assert_eq!(first, second);
    }
}
