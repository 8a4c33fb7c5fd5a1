//! Global FDR correction over a pooled p-value family.
//!
//! The family is pooled once, corrected once, and the adjusted values are
//! scattered back to their groups through the recorded spans. Correcting
//! group by group would change the family size and is never done here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::bh::{benjamini_hochberg, BhOutcome};
use super::family::PValueFamily;
use crate::artifact::write_json_pretty;
use crate::config::{validate_alpha, CorrectionConfig};
use crate::error::{GroupRejection, Result, TwinstatError};
use crate::metrics::METRICS;
use crate::obs;

/// Summary of one correction pass, persisted next to the adjusted family.
///
/// The four significance fields are `None` (JSON `null`) when nothing is
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    pub alpha: f64,
    pub n_tests: usize,
    pub n_significant: usize,
    /// Largest raw p-value still rejected: the "p < X (FDR-adjusted)" cutoff.
    pub effective_fdr_threshold_raw: Option<f64>,
    pub min_adjusted_p_among_significant: Option<f64>,
    pub max_adjusted_p_among_significant: Option<f64>,
}

impl CorrectionSummary {
    fn from_outcome(raw: &[f64], outcome: &BhOutcome, alpha: f64) -> Self {
        let mut n_significant = 0;
        let mut threshold: Option<f64> = None;
        let mut min_adj: Option<f64> = None;
        let mut max_adj: Option<f64> = None;

        for ((&p, &q), _) in raw
            .iter()
            .zip(&outcome.adjusted)
            .zip(&outcome.rejected)
            .filter(|(_, rejected)| **rejected)
        {
            n_significant += 1;
            threshold = Some(threshold.map_or(p, |t| t.max(p)));
            min_adj = Some(min_adj.map_or(q, |m| m.min(q)));
            max_adj = Some(max_adj.map_or(q, |m| m.max(q)));
        }

        Self {
            alpha,
            n_tests: raw.len(),
            n_significant,
            effective_fdr_threshold_raw: threshold,
            min_adjusted_p_among_significant: min_adj,
            max_adjusted_p_among_significant: max_adj,
        }
    }
}

/// Output of [`correct`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    /// Same groups, same order and lengths as the input, adjusted values.
    pub adjusted: PValueFamily,
    /// Rejection mask in pooled order.
    pub rejected: Vec<bool>,
    pub summary: CorrectionSummary,
}

/// Correct every p-value in `family` as one Benjamini–Hochberg family.
///
/// # Errors
///
/// - `TwinstatError::InvalidAlpha` — `alpha` outside (0, 1).
/// - `TwinstatError::NoDataToCorrect` — the pooled family holds no values.
pub fn correct(family: &PValueFamily, alpha: f64) -> Result<CorrectionResult> {
    let alpha = validate_alpha(alpha)?;
    let pooled = family.pool();
    if pooled.is_empty() {
        return Err(TwinstatError::NoDataToCorrect);
    }

    let outcome = benjamini_hochberg(&pooled.values, alpha);
    let summary = CorrectionSummary::from_outcome(&pooled.values, &outcome, alpha);
    let adjusted = pooled.scatter(&outcome.adjusted);

    Ok(CorrectionResult {
        adjusted,
        rejected: outcome.rejected,
        summary,
    })
}

/// Result of writing both correction artifacts.
///
/// Each write is attempted regardless of the other; inspect both fields
/// (or call [`PersistOutcome::into_result`]) to detect partial completion.
#[derive(Debug)]
pub struct PersistOutcome {
    pub adjusted: Result<PathBuf>,
    pub summary: Result<PathBuf>,
}

impl PersistOutcome {
    pub fn is_complete(&self) -> bool {
        self.adjusted.is_ok() && self.summary.is_ok()
    }

    /// Both paths, or the first error encountered.
    pub fn into_result(self) -> Result<(PathBuf, PathBuf)> {
        Ok((self.adjusted?, self.summary?))
    }
}

/// Write the adjusted family and the summary as two independent documents.
pub fn persist(
    result: &CorrectionResult,
    adjusted_path: &Path,
    summary_path: &Path,
) -> PersistOutcome {
    let adjusted = write_artifact("adjusted", adjusted_path, &result.adjusted);
    let summary = write_artifact("summary", summary_path, &result.summary);
    PersistOutcome { adjusted, summary }
}

fn write_artifact<T: Serialize>(kind: &str, path: &Path, value: &T) -> Result<PathBuf> {
    match write_json_pretty(path, value) {
        Ok(()) => {
            obs::emit_artifact_written(kind, path);
            Ok(path.to_path_buf())
        }
        Err(e) => {
            obs::emit_artifact_failed(kind, path, &e);
            Err(e)
        }
    }
}

/// Everything a caller needs to report on a finished correction pass.
#[derive(Debug)]
pub struct CorrectionRun {
    pub result: CorrectionResult,
    /// Groups dropped from the family during validation.
    pub rejected_groups: Vec<GroupRejection>,
    pub persisted: PersistOutcome,
}

/// Load, correct and persist according to `cfg`.
///
/// Nothing is written when the input is missing, when `strict` is set and a
/// group fails validation, or when no values are left to correct.
pub fn run_correction(cfg: &CorrectionConfig) -> Result<CorrectionRun> {
    let _span = obs::PassSpan::enter("correct");
    obs::emit_pass_started("correct", &cfg.input);
    validate_alpha(cfg.alpha)?;

    let loaded = PValueFamily::load(&cfg.input)?;
    for rejection in &loaded.rejected {
        METRICS.inc_groups_rejected();
        obs::emit_group_rejected(&rejection.group, &rejection.reason);
    }
    if cfg.strict {
        if let Some(first) = loaded.rejected.first() {
            return Err(first.clone().into());
        }
    }

    let result = correct(&loaded.family, cfg.alpha)?;
    METRICS.add_tests_corrected(result.summary.n_tests as u64);
    obs::emit_correction_finished(
        loaded.family.len(),
        result.summary.n_tests,
        result.summary.n_significant,
        result.summary.alpha,
    );

    let persisted = persist(&result, &cfg.adjusted_path(), &cfg.summary_path());
    Ok(CorrectionRun {
        result,
        rejected_groups: loaded.rejected,
        persisted,
    })
}
