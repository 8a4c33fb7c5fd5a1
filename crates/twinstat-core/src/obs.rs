//! Structured lifecycle events for correction and reshape passes.
//!
//! Every event carries an `event` field so log pipelines can filter on it,
//! e.g. `event=reshape.file_skipped`.

use std::path::Path;

use tracing::{info, warn};

/// RAII guard that keeps a pass-scoped span entered while a pass runs.
///
/// ```ignore
/// let _span = PassSpan::enter("correct");
/// // events emitted here carry pass = "correct"
/// ```
pub struct PassSpan {
    _span: tracing::span::EnteredSpan,
}

impl PassSpan {
    pub fn enter(pass: &str) -> Self {
        let span = tracing::info_span!("twinstat.pass", pass = %pass);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_pass_started(pass: &str, input: &Path) {
    info!(event = "pass.started", pass = %pass, input = %input.display());
}

/// Emit event: correction finished over the pooled family.
pub fn emit_correction_finished(
    n_groups: usize,
    n_tests: usize,
    n_significant: usize,
    alpha: f64,
) {
    info!(
        event = "correct.finished",
        n_groups = n_groups,
        n_tests = n_tests,
        n_significant = n_significant,
        alpha = alpha,
    );
}

pub fn emit_group_rejected(group: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "correct.group_rejected", group = %group, reason = %reason);
}

pub fn emit_file_processed(file: &str, rows: usize, columns: usize) {
    info!(event = "reshape.file_processed", file = %file, rows = rows, columns = columns);
}

/// Emit event: a result table was skipped (warning level).
pub fn emit_file_skipped(file: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "reshape.file_skipped", file = %file, reason = %reason);
}

/// Emit event: reshape finished with processed/skipped counts and final shape.
pub fn emit_reshape_finished(processed: usize, skipped: usize, rows: usize, columns: usize) {
    info!(
        event = "reshape.finished",
        processed = processed,
        skipped = skipped,
        rows = rows,
        columns = columns,
    );
}

pub fn emit_artifact_written(kind: &str, path: &Path) {
    info!(event = "artifact.written", kind = %kind, path = %path.display());
}

/// Emit event: an artifact could not be written (warning level).
pub fn emit_artifact_failed(kind: &str, path: &Path, error: &dyn std::fmt::Display) {
    warn!(event = "artifact.failed", kind = %kind, path = %path.display(), error = %error);
}
