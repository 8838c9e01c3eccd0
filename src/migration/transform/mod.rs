//! Pure per-record transform steps.
//!
//! Each transform converts one record from version k to k+1, or declares it
//! already up to date. Transforms never touch the store; the owning
//! migration step persists non-skipped results.

mod v0_to_v1;
mod v1_to_v2;

pub use v0_to_v1::transform_project_v0_to_v1;
pub use v1_to_v2::{transform_project_v1_to_v2, MediaAssetLookup};

use chrono::{DateTime, Utc};

/// Options shared by transform steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Instant used for synthesized timestamps; defaults to the current
    /// instant. Injected by tests for deterministic output.
    pub now: Option<DateTime<Utc>>,
}

impl TransformOptions {
    pub(crate) fn now_or_current(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
