//! v0 -> v1: synthesize the initial scene container.
//!
//! Version 0 records had no scene structure. Version 1 introduces `scenes`
//! with exactly one main scene, and `currentSceneId` pointing at it.

use super::TransformOptions;
use crate::migration::result::{MigrationResult, SkipReason};
use crate::record::{ProjectRecord, Scene};

/// Brings one record from v0 to v1.
///
/// Records that already carry scenes are skipped untouched, which makes the
/// transform idempotent: applying it to its own output always skips.
pub fn transform_project_v0_to_v1(
    project: ProjectRecord,
    options: &TransformOptions,
) -> MigrationResult<ProjectRecord> {
    if project.has_scenes() {
        return MigrationResult::Skipped {
            record: project,
            reason: SkipReason::AlreadyHasScenes,
        };
    }

    let now = options.now_or_current();
    let scene = Scene::new_main(now);

    let mut updated = project;
    updated.current_scene_id = Some(scene.id.clone());
    updated.scenes = Some(vec![scene.into_value()]);
    updated.version = Some(1);
    updated.touch(now);

    MigrationResult::Migrated(updated)
}
