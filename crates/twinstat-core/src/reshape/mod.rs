//! Wide-format reshaper: long survey result tables to one row per agent.

pub mod batch;
pub mod pivot;
pub mod table;

pub use batch::{
    candidate_files, process_file, reshape_directory, run_reshape, FileOutcome, ReshapeOutcome,
};
pub use pivot::pivot;
pub use table::{LongTable, WideTable};
