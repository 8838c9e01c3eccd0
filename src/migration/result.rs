//! Per-record transform outcomes.

use std::fmt;

/// Why a transform declared a record already up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record already carries at least one scene.
    AlreadyHasScenes,
    /// The record is already at (or past) the step's target version.
    AlreadyMigrated {
        /// The version the record was found at.
        version: u32,
    },
    /// The record has not reached the step's source version yet; an earlier
    /// step must bring it forward first.
    BelowSourceVersion {
        /// The version the record was found at.
        version: u32,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyHasScenes => write!(f, "already has scenes"),
            SkipReason::AlreadyMigrated { version } => {
                write!(f, "already at version {version}")
            }
            SkipReason::BelowSourceVersion { version } => {
                write!(f, "still at version {version}")
            }
        }
    }
}

/// Outcome of running a transform step against one record.
///
/// A skip is not an error: it is the idempotence signal that makes repeated
/// and interrupted runs safe.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationResult<T> {
    /// The record was rewritten and must be persisted.
    Migrated(T),
    /// No work was needed; nothing should be persisted.
    Skipped {
        /// The record exactly as it was passed in.
        record: T,
        /// Why the transform declined to touch it.
        reason: SkipReason,
    },
}

impl<T> MigrationResult<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, MigrationResult::Skipped { .. })
    }

    /// The record, migrated or not.
    pub fn into_record(self) -> T {
        match self {
            MigrationResult::Migrated(record) => record,
            MigrationResult::Skipped { record, .. } => record,
        }
    }
}
