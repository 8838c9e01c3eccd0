//! Migration-specific error types.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors surfaced by the migration engine.
///
/// Only run-fatal conditions live here. Skipped records, unresolved
/// identifiers, per-record store failures, and cleanup failures are policy,
/// not errors: they are logged and the run continues.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Listing the records of a store failed; fatal to the current step.
    #[error("failed to enumerate records in store `{store}`: {source}")]
    Enumeration {
        /// The store that could not be enumerated.
        store: String,
        #[source]
        source: StoreError,
    },

    /// Reading or writing the recorded schema version failed.
    #[error("failed to access the recorded schema version: {source}")]
    VersionStore {
        #[source]
        source: StoreError,
    },

    /// The registry was configured with duplicate or non-increasing steps.
    #[error("invalid migration registry: {message}")]
    InvalidRegistry {
        /// Description of the misconfiguration.
        message: String,
    },

    /// Terminal wrapper identifying which step failed, surfaced by the
    /// runner as the single user-visible error of a failed run.
    #[error("migration v{from} -> v{to} failed: {source}")]
    Step {
        from: u32,
        to: u32,
        #[source]
        source: Box<MigrationError>,
    },
}
