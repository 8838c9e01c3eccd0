//! Versioned migration engine for project records.
//!
//! A record's state is its `version` integer; registered migration steps
//! define the transitions `from -> to`. The runner walks the chain from the
//! store's recorded version until no further step applies, persisting the
//! version after each cleanly completed step so an interrupted run restarts
//! safely; a step that had to defer records holds the recorded version back
//! so those records are retried on the next run.
//!
//! Idempotence is a per-transform contract: every transform detects
//! already-migrated input and declares it skipped instead of re-transforming
//! it, so records left at mixed versions by an interrupted run converge on a
//! re-run.
//!
//! # Failure policy
//!
//! - Failing to enumerate a store aborts the step and surfaces through the
//!   runner as a single terminal [`MigrationError`].
//! - A lookup or write failure on one record is logged and the record is
//!   deferred: it stays at its old version, the step's [`StepReport`] keeps
//!   the recorded version from advancing, and the next run retries it.
//! - A malformed or id-less record is logged and skipped as policy; it is
//!   never migrated and never blocks the run.
//! - Cleanup of legacy stores is best-effort and never fails a record.

pub mod cleanup;
pub mod error;
pub mod result;
pub mod runner;
pub mod transform;

mod v0_to_v1;
mod v1_to_v2;

pub use cleanup::{CleanupExecutor, CleanupReport};
pub use error::MigrationError;
pub use result::{MigrationResult, SkipReason};
pub use runner::{Migration, MigrationRunner, StepReport};
pub use transform::{
    transform_project_v0_to_v1, transform_project_v1_to_v2, MediaAssetLookup, TransformOptions,
};
pub use v0_to_v1::V0ToV1Migration;
pub use v1_to_v2::V1ToV2Migration;
