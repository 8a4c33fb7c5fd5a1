//! Twinstat Core Library
//!
//! Statistical post-processing for synthetic-twin survey studies:
//!
//! - [`correction`]: Benjamini–Hochberg FDR correction across every named
//!   group of p-values at once, with per-group re-partitioning and a
//!   significance summary.
//! - [`reshape`]: long-to-wide pivot of per-agent Likert answers with
//!   provenance and personality-score columns.
//!
//! Both passes are batch transforms over flat files and never call each
//! other.

pub mod artifact;
pub mod config;
pub mod correction;
pub mod error;
pub mod metrics;
pub mod obs;
pub mod reshape;
pub mod telemetry;

pub use config::{
    canonical_name, ColumnContract, CorrectionConfig, ReshapeConfig, CANONICAL_RENAMES,
    DEFAULT_ALPHA, DEFAULT_AUX_FIELDS, SOURCE_FILE_COLUMN,
};
pub use correction::{
    benjamini_hochberg, correct, persist, run_correction, CorrectionResult, CorrectionRun,
    CorrectionSummary, PValueFamily, PersistOutcome,
};
pub use error::{GroupError, GroupRejection, Result, SkipReason, TwinstatError};
pub use reshape::{
    reshape_directory, run_reshape, FileOutcome, LongTable, ReshapeOutcome, WideTable,
};

pub use metrics::METRICS;
pub use obs::PassSpan;
pub use telemetry::init_tracing;

/// Twinstat version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
