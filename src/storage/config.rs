//! Store naming scheme.

/// Names of the stores the migration engine touches.
///
/// Auxiliary stores are namespaced by project id, and per-scene stores by
/// project id plus scene id. The defaults carry the video-editor namespace;
/// embedders running against a different deployment override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNaming {
    /// Primary store holding project records, keyed by project id.
    pub projects: String,
    /// Store holding engine bookkeeping, currently just the recorded schema
    /// version.
    pub meta: String,
    /// Prefix of the per-project media metadata stores.
    pub media_prefix: String,
    /// Prefix of the legacy per-project and per-scene timeline stores.
    pub timelines_prefix: String,
}

impl Default for StoreNaming {
    fn default() -> Self {
        Self {
            projects: "video-editor-projects".to_owned(),
            meta: "video-editor-meta".to_owned(),
            media_prefix: "video-editor-media".to_owned(),
            timelines_prefix: "video-editor-timelines".to_owned(),
        }
    }
}

impl StoreNaming {
    /// Key under which the recorded schema version lives in the meta store.
    pub const SCHEMA_VERSION_KEY: &'static str = "schema-version";

    /// Media metadata store of one project.
    pub fn media_store(&self, project_id: &str) -> String {
        format!("{}-{}", self.media_prefix, project_id)
    }

    /// Project-level legacy timeline store.
    pub fn project_timelines_store(&self, project_id: &str) -> String {
        format!("{}-{}", self.timelines_prefix, project_id)
    }

    /// Per-scene legacy timeline store.
    pub fn scene_timelines_store(&self, project_id: &str, scene_id: &str) -> String {
        format!("{}-{}-{}", self.timelines_prefix, project_id, scene_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_names_preserve_namespacing_shape() {
        let naming = StoreNaming::default();
        assert_eq!(naming.media_store("p1"), "video-editor-media-p1");
        assert_eq!(
            naming.project_timelines_store("p1"),
            "video-editor-timelines-p1"
        );
        assert_eq!(
            naming.scene_timelines_store("p1", "s1"),
            "video-editor-timelines-p1-s1"
        );
    }
}
