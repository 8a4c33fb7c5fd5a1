//! Process-wide counters for twinstat runs.
//!
//! Passes bump these as they go; the binary calls [`Metrics::flush`] once
//! at the end of a run to emit them as a single `info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    files_processed: AtomicU64,
    files_skipped: AtomicU64,
    groups_rejected: AtomicU64,
    tests_corrected: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            files_processed: AtomicU64::new(0),
            files_skipped: AtomicU64::new(0),
            groups_rejected: AtomicU64::new(0),
            tests_corrected: AtomicU64::new(0),
        }
    }

    pub fn inc_files_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "files_processed", "counter incremented");
    }

    pub fn inc_files_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "files_skipped", "counter incremented");
    }

    pub fn inc_groups_rejected(&self) {
        self.groups_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "groups_rejected", "counter incremented");
    }

    /// Add `n` tests to the corrected-tests counter.
    pub fn add_tests_corrected(&self, n: u64) {
        self.tests_corrected.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "tests_corrected", n, "counter incremented");
    }

    /// Emit all current counter values as one `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            files_processed = self.files_processed(),
            files_skipped = self.files_skipped(),
            groups_rejected = self.groups_rejected(),
            tests_corrected = self.tests_corrected(),
        );
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn files_skipped(&self) -> u64 {
        self.files_skipped.load(Ordering::Relaxed)
    }

    pub fn groups_rejected(&self) -> u64 {
        self.groups_rejected.load(Ordering::Relaxed)
    }

    pub fn tests_corrected(&self) -> u64 {
        self.tests_corrected.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.files_processed.store(0, Ordering::Relaxed);
        self.files_skipped.store(0, Ordering::Relaxed);
        self.groups_rejected.store(0, Ordering::Relaxed);
        self.tests_corrected.store(0, Ordering::Relaxed);
    }
}
