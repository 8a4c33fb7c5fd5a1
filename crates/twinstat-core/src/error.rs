//! Error taxonomy for twinstat passes.
//!
//! Three classes matter to callers:
//! - input-absent: the configured file or directory does not exist
//! - degenerate input: inputs exist but nothing usable is left in them
//! - validation: a single group or file is unusable and gets skipped
//!
//! Only the first two are fatal for a run.

use std::path::PathBuf;

/// Why a single p-value group was rejected during loading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroupError {
    #[error("group name must not be empty")]
    EmptyName,

    #[error("group name appears more than once")]
    DuplicateName,

    #[error("group value must be an array of p-values")]
    NotASequence,

    #[error("value at index {index} is not numeric: {value}")]
    NonNumeric { index: usize, value: String },

    #[error("value at index {index} is outside [0, 1]: {value}")]
    OutOfRange { index: usize, value: f64 },
}

/// A p-value group that could not be used, with the group it came from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("group {group:?} rejected: {reason}")]
pub struct GroupRejection {
    pub group: String,
    pub reason: GroupError,
}

/// Why a single result table was skipped by the reshaper.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("output column {column:?} would be produced twice")]
    ColumnCollision { column: String },

    #[error("duplicate entry for agent {agent:?} and question {question:?}")]
    DuplicatePair { agent: String, question: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level errors.
#[derive(Debug, thiserror::Error)]
pub enum TwinstatError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("no data to correct: pooled p-value family is empty")]
    NoDataToCorrect,

    #[error("no valid input in {}: all {skipped} candidate files were skipped", dir.display())]
    NoValidInput { dir: PathBuf, skipped: usize },

    #[error("invalid p-value family: expected a JSON object of group name to p-values")]
    NotAFamily,

    #[error(transparent)]
    InvalidGroup(#[from] GroupRejection),

    #[error("alpha must lie in (0, 1), got {0}")]
    InvalidAlpha(f64),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TwinstatError {
    /// True for failures caused by inputs that exist but hold nothing usable.
    pub fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            TwinstatError::NoDataToCorrect | TwinstatError::NoValidInput { .. }
        )
    }
}

/// Result type for twinstat operations.
pub type Result<T> = std::result::Result<T, TwinstatError>;
