//! Project record data model.
//!
//! Records are JSON documents with a handful of known, individually optional
//! fields; everything else is preserved verbatim through a migration. A value
//! that does not deserialize into [`ProjectRecord`] is a malformed record:
//! migration steps skip it and leave it in the store untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Formats an instant the way record timestamps are persisted.
pub(crate) fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A versioned project document.
///
/// An absent `version` means version 0. `updatedAt` is only used by records
/// that carry no `metadata` mapping; records with metadata keep their
/// timestamp inside it (see [`ProjectRecord::touch`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Scenes are kept as raw values: legacy records may carry scene shapes
    /// this crate no longer models, and migrations must not drop them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields this crate does not know about, preserved through migrations.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectRecord {
    /// Deserializes a stored value. Fails for anything that is not a
    /// well-formed record mapping.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serializes the record back into its wire shape.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Resolves the record's identifier: the top-level `id` when it is a
    /// non-empty string, else `metadata.id`, else nothing. Absence is an
    /// explicit outcome, not an error; callers skip such records.
    pub fn project_id(&self) -> Option<&str> {
        if let Some(id) = self.id.as_deref() {
            if !id.is_empty() {
                return Some(id);
            }
        }
        match self.metadata.as_ref()?.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Whether the record carries at least one scene. A present-but-empty
    /// sequence counts as no scenes.
    pub fn has_scenes(&self) -> bool {
        self.scenes.as_ref().is_some_and(|scenes| !scenes.is_empty())
    }

    /// Scene identifiers found in the record, skipping scenes that are not
    /// objects or whose `id` is not a string.
    pub fn scene_ids(&self) -> Vec<&str> {
        let Some(scenes) = self.scenes.as_ref() else {
            return Vec::new();
        };
        scenes
            .iter()
            .filter_map(|scene| scene.get("id")?.as_str())
            .collect()
    }

    /// Applies the timestamp placement policy: records with a `metadata`
    /// mapping get `metadata.updatedAt` (other metadata fields preserved,
    /// top-level `updatedAt` untouched); records without metadata get the
    /// top-level `updatedAt` and no metadata mapping is introduced.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let stamp = format_timestamp(now);
        match self.metadata.as_mut() {
            Some(metadata) => {
                metadata.insert("updatedAt".to_owned(), Value::String(stamp));
            }
            None => self.updated_at = Some(stamp),
        }
    }
}

/// A scene inside a project record, introduced at schema version 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub is_main: bool,
    /// Timeline tracks; opaque to the migration engine.
    #[serde(default)]
    pub tracks: Vec<Value>,
    #[serde(default)]
    pub bookmarks: Vec<Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl Scene {
    /// Synthesizes the single main scene a sceneless record receives at
    /// version 1: fresh unique id, empty tracks and bookmarks.
    pub fn new_main(now: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(now);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Main scene".to_owned(),
            is_main: true,
            tracks: Vec::new(),
            bookmarks: Vec::new(),
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// Wire shape of the scene.
    pub fn into_value(self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "isMain": self.is_main,
            "tracks": self.tracks,
            "bookmarks": self.bookmarks,
            "createdAt": self.created_at,
            "updatedAt": self.updated_at,
        })
    }
}
