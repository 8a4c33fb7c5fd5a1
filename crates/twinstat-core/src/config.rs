//! Run configuration for the correction and reshape passes.
//!
//! Defaults match the layout used by the survey pipeline: `all_pvals.json`
//! corrected into `fdr_adjusted/`, and result tables keyed by the
//! `agent.prolific_pid` / `scenario.question_name` / `answer.question`
//! columns.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TwinstatError};

/// Significance level used when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.05;

pub const DEFAULT_PVALUES_FILE: &str = "all_pvals.json";
pub const DEFAULT_FDR_DIR: &str = "fdr_adjusted";

pub const DEFAULT_AGENT_COLUMN: &str = "agent.prolific_pid";
pub const DEFAULT_QUESTION_COLUMN: &str = "scenario.question_name";
pub const DEFAULT_ANSWER_COLUMN: &str = "answer.question";

/// Name of the provenance column added to every wide row.
pub const SOURCE_FILE_COLUMN: &str = "source_file";

/// Big Five personality scores carried alongside each agent's answers.
pub const DEFAULT_AUX_FIELDS: &[&str] = &[
    "agent.extraversion_score",
    "agent.agreeableness_score",
    "agent.conscientiousness_score",
    "agent.neuroticism_score",
    "agent.openness_score",
];

/// Canonical source column name → public output name.
pub const CANONICAL_RENAMES: &[(&str, &str)] = &[
    ("agent.prolific_pid", "PROLIFIC_PID"),
    ("agent.extraversion_score", "extraversion_score"),
    ("agent.agreeableness_score", "agreeableness_score"),
    ("agent.conscientiousness_score", "conscientiousness_score"),
    ("agent.neuroticism_score", "neuroticism_score"),
    ("agent.openness_score", "openness_score"),
];

/// Public output name for a source column; unmapped names pass through.
pub fn canonical_name(column: &str) -> &str {
    CANONICAL_RENAMES
        .iter()
        .find(|(from, _)| *from == column)
        .map(|(_, to)| *to)
        .unwrap_or(column)
}

/// Case-insensitive extension match; `extension` has no leading dot.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Check that `alpha` is a usable significance level.
pub fn validate_alpha(alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(TwinstatError::InvalidAlpha(alpha))
    }
}

/// Settings for one correction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// JSON document mapping group names to raw p-values.
    pub input: PathBuf,
    /// Directory receiving the adjusted family and the summary.
    pub output_dir: PathBuf,
    pub alpha: f64,
    /// Abort on the first rejected group instead of skipping it.
    pub strict: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_PVALUES_FILE),
            output_dir: PathBuf::from(DEFAULT_FDR_DIR),
            alpha: DEFAULT_ALPHA,
            strict: false,
        }
    }
}

impl CorrectionConfig {
    fn input_stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pvals".to_string())
    }

    /// `<output_dir>/<stem>_fdr.json`
    pub fn adjusted_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_fdr.json", self.input_stem()))
    }

    /// `<output_dir>/<stem>_fdr_summary.json`
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_fdr_summary.json", self.input_stem()))
    }
}

/// The three columns every long-format result table must expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnContract {
    pub agent: String,
    pub question: String,
    pub answer: String,
}

impl Default for ColumnContract {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT_COLUMN.to_string(),
            question: DEFAULT_QUESTION_COLUMN.to_string(),
            answer: DEFAULT_ANSWER_COLUMN.to_string(),
        }
    }
}

impl ColumnContract {
    pub fn new(
        agent: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Required columns in agent, question, answer order.
    pub fn required(&self) -> [&str; 3] {
        [&self.agent, &self.question, &self.answer]
    }
}

/// Settings for one reshape pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReshapeConfig {
    pub input_dir: PathBuf,
    /// Combined wide-format CSV; parent directories are created on write.
    pub output: PathBuf,
    pub columns: ColumnContract,
    /// Per-agent fields copied onto each wide row when present.
    pub aux_fields: Vec<String>,
    /// File extension (without dot) selecting candidate tables.
    pub extension: String,
}

impl ReshapeConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
            columns: ColumnContract::default(),
            aux_fields: DEFAULT_AUX_FIELDS.iter().map(|s| s.to_string()).collect(),
            extension: "csv".to_string(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnContract) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_aux_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aux_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}
