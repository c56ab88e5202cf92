//! Progress reporting for the spatial join.
//!
//! The join reports one unit per crash tested. Rendering is left to the
//! caller: `crash_impact_cli_utils` draws an `indicatif` bar, tests and
//! library callers pass [`null_progress()`].

use std::sync::Arc;

/// Receives progress updates from a long-running join.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of units expected.
    fn set_total(&self, total: u64);

    /// Records `delta` more completed units.
    fn inc(&self, delta: u64);

    /// Marks the work as done.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}

/// A shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
