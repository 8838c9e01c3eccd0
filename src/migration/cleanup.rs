//! Best-effort removal of obsolete per-project timeline stores.

use std::sync::Arc;

use tracing::debug;

use crate::record::ProjectRecord;
use crate::storage::{StoreBackend, StoreNaming};

/// Outcome of one cleanup pass. Informational only: callers must not treat a
/// non-zero failure count as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Stores whose deletion was attempted.
    pub attempted: usize,
    /// Deletions that failed and were discarded.
    pub failed: usize,
}

/// Deletes the auxiliary stores a migrated record no longer needs.
///
/// Auxiliary stores are derived state, never source of truth, so every
/// deletion failure is swallowed: one failing store must not abort the
/// remaining deletions or the owning migration run.
pub struct CleanupExecutor {
    backend: Arc<dyn StoreBackend>,
    naming: StoreNaming,
}

impl CleanupExecutor {
    pub fn new(backend: Arc<dyn StoreBackend>, naming: StoreNaming) -> Self {
        Self { backend, naming }
    }

    /// Removes the legacy timeline stores of one migrated project: one per
    /// scene id found in the record, plus the project-level store.
    pub async fn remove_legacy_timeline_stores(
        &self,
        project_id: &str,
        project: &ProjectRecord,
    ) -> CleanupReport {
        let mut names: Vec<String> = project
            .scene_ids()
            .into_iter()
            .map(|scene_id| self.naming.scene_timelines_store(project_id, scene_id))
            .collect();
        names.push(self.naming.project_timelines_store(project_id));

        let mut report = CleanupReport::default();
        for name in &names {
            report.attempted += 1;
            if let Err(err) = self.backend.delete_store(name).await {
                report.failed += 1;
                debug!(store = %name, error = %err, "legacy store deletion failed, ignoring");
            }
        }
        report
    }
}
