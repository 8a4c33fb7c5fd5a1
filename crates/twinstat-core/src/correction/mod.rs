//! Correction engine: one Benjamini–Hochberg pass over every named group.

pub mod bh;
pub mod engine;
pub mod family;

pub use bh::{benjamini_hochberg, BhOutcome};
pub use engine::{
    correct, persist, run_correction, CorrectionResult, CorrectionRun, CorrectionSummary,
    PersistOutcome,
};
pub use family::{GroupSpan, LoadedFamily, PValueFamily, PValueGroup, PooledFamily};
