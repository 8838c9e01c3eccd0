//! v1 -> v2: embed media asset metadata into timeline clips.
//!
//! Version 1 kept clip media metadata in a per-project media store; version 2
//! embeds it into the clip itself so the per-project auxiliary stores can be
//! retired afterwards.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::TransformOptions;
use crate::migration::result::{MigrationResult, SkipReason};
use crate::record::ProjectRecord;
use crate::storage::StoreError;

/// Asset metadata lookup, scoped to a single project by whoever constructs
/// it. Returning `None` means the referenced asset does not exist.
#[async_trait]
pub trait MediaAssetLookup: Send + Sync {
    async fn load(&self, media_id: &str) -> Result<Option<Value>, StoreError>;
}

/// Brings one record from v1 to v2. Records that never reached v1 are
/// skipped untouched: the version chain only moves one step at a time, and
/// promoting a v0 record here would hand it a v2 stamp without the scene
/// structure v1 introduces.
///
/// Every clip carrying a `mediaId` gets the asset metadata embedded under
/// `media`. A lookup miss leaves the clip unresolved rather than wedging the
/// record at v1; a lookup I/O failure propagates so the owning step can
/// retry the record on the next run.
pub async fn transform_project_v1_to_v2(
    project: ProjectRecord,
    lookup: &dyn MediaAssetLookup,
    options: &TransformOptions,
) -> Result<MigrationResult<ProjectRecord>, StoreError> {
    let version = project.version.unwrap_or(0);
    if version >= 2 {
        return Ok(MigrationResult::Skipped {
            record: project,
            reason: SkipReason::AlreadyMigrated { version },
        });
    }
    if version < 1 {
        return Ok(MigrationResult::Skipped {
            record: project,
            reason: SkipReason::BelowSourceVersion { version },
        });
    }

    let mut updated = project;
    if let Some(scenes) = updated.scenes.as_mut() {
        for scene in scenes.iter_mut() {
            let Some(tracks) = scene.get_mut("tracks").and_then(Value::as_array_mut) else {
                continue;
            };
            for track in tracks.iter_mut() {
                let Some(clips) = track.get_mut("clips").and_then(Value::as_array_mut) else {
                    continue;
                };
                for clip in clips.iter_mut() {
                    embed_clip_media(clip, lookup).await?;
                }
            }
        }
    }

    updated.version = Some(2);
    updated.touch(options.now_or_current());
    Ok(MigrationResult::Migrated(updated))
}

async fn embed_clip_media(
    clip: &mut Value,
    lookup: &dyn MediaAssetLookup,
) -> Result<(), StoreError> {
    let Some(media_id) = clip.get("mediaId").and_then(Value::as_str) else {
        return Ok(());
    };
    if clip.get("media").is_some() {
        return Ok(());
    }

    let media_id = media_id.to_owned();
    match lookup.load(&media_id).await? {
        Some(asset) => {
            if let Some(clip) = clip.as_object_mut() {
                clip.insert("media".to_owned(), asset);
            }
        }
        None => warn!(media_id = %media_id, "media asset missing, clip reference left unresolved"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;

    struct FakeLookup {
        assets: HashMap<String, Value>,
    }

    impl FakeLookup {
        fn with(entries: &[(&str, Value)]) -> Self {
            Self {
                assets: entries
                    .iter()
                    .map(|(id, asset)| ((*id).to_owned(), asset.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl MediaAssetLookup for FakeLookup {
        async fn load(&self, media_id: &str) -> Result<Option<Value>, StoreError> {
            Ok(self.assets.get(media_id).cloned())
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl MediaAssetLookup for BrokenLookup {
        async fn load(&self, _media_id: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Backend("media store unavailable".to_owned()))
        }
    }

    fn options() -> TransformOptions {
        TransformOptions {
            now: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    fn v1_record() -> ProjectRecord {
        ProjectRecord::from_value(json!({
            "id": "p1",
            "version": 1,
            "scenes": [{
                "id": "s1",
                "tracks": [{"clips": [{"id": "c1", "mediaId": "m1"}]}]
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_skips_record_already_at_target_version() {
        let record = ProjectRecord::from_value(json!({"id": "p1", "version": 2})).unwrap();
        let lookup = FakeLookup::with(&[]);
        let result = transform_project_v1_to_v2(record, &lookup, &options())
            .await
            .unwrap();
        let MigrationResult::Skipped { reason, .. } = result else {
            panic!("expected a skip");
        };
        assert_eq!(reason.to_string(), "already at version 2");
    }

    #[tokio::test]
    async fn test_skips_record_still_below_source_version() {
        let expected = ProjectRecord::from_value(json!({"id": "p1", "version": 0})).unwrap();
        let lookup = FakeLookup::with(&[]);
        let result = transform_project_v1_to_v2(expected.clone(), &lookup, &options())
            .await
            .unwrap();
        let MigrationResult::Skipped { record, reason } = result else {
            panic!("expected a skip");
        };
        assert_eq!(reason.to_string(), "still at version 0");
        // The record keeps its v0 shape; the scene-synthesis step owns it.
        assert_eq!(record, expected);

        // An absent version means version 0 and is treated the same way.
        let implicit = ProjectRecord::from_value(json!({"id": "p1"})).unwrap();
        let result = transform_project_v1_to_v2(implicit, &lookup, &options())
            .await
            .unwrap();
        assert!(result.is_skipped());
    }

    #[tokio::test]
    async fn test_embeds_media_metadata_into_clips() {
        let lookup = FakeLookup::with(&[("m1", json!({"name": "take.mp4", "durationMs": 1200}))]);
        let result = transform_project_v1_to_v2(v1_record(), &lookup, &options())
            .await
            .unwrap();
        let output = result.into_record();

        assert_eq!(output.version, Some(2));
        let clip = &output.scenes.as_ref().unwrap()[0]["tracks"][0]["clips"][0];
        assert_eq!(
            clip.get("media"),
            Some(&json!({"name": "take.mp4", "durationMs": 1200}))
        );
        assert_eq!(
            output.updated_at.as_deref(),
            Some("2024-05-01T12:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn test_lookup_miss_leaves_clip_unresolved_but_migrates() {
        let lookup = FakeLookup::with(&[]);
        let result = transform_project_v1_to_v2(v1_record(), &lookup, &options())
            .await
            .unwrap();
        let output = result.into_record();

        assert_eq!(output.version, Some(2));
        let clip = &output.scenes.as_ref().unwrap()[0]["tracks"][0]["clips"][0];
        assert_eq!(clip.get("media"), None);
        assert_eq!(clip.get("mediaId"), Some(&json!("m1")));
    }

    #[tokio::test]
    async fn test_already_embedded_clip_is_not_looked_up_again() {
        let record = ProjectRecord::from_value(json!({
            "id": "p1",
            "version": 1,
            "scenes": [{
                "id": "s1",
                "tracks": [{"clips": [{"mediaId": "m1", "media": {"name": "kept.mp4"}}]}]
            }]
        }))
        .unwrap();
        // BrokenLookup would fail if the clip were looked up.
        let result = transform_project_v1_to_v2(record, &BrokenLookup, &options())
            .await
            .unwrap();
        let output = result.into_record();
        let clip = &output.scenes.as_ref().unwrap()[0]["tracks"][0]["clips"][0];
        assert_eq!(clip.get("media"), Some(&json!({"name": "kept.mp4"})));
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let result = transform_project_v1_to_v2(v1_record(), &BrokenLookup, &options()).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_record_without_scenes_still_migrates() {
        let record = ProjectRecord::from_value(json!({"id": "p1", "version": 1})).unwrap();
        let lookup = FakeLookup::with(&[]);
        let output = transform_project_v1_to_v2(record, &lookup, &options())
            .await
            .unwrap()
            .into_record();
        assert_eq!(output.version, Some(2));
    }
}
