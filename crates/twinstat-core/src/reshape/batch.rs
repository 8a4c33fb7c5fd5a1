//! Directory-level reshape: pivot every candidate table, skip bad ones,
//! concatenate the rest.

use std::path::{Path, PathBuf};

use super::pivot::pivot;
use super::table::{LongTable, WideTable};
use crate::config::{has_extension, ColumnContract, ReshapeConfig};
use crate::error::{Result, SkipReason, TwinstatError};
use crate::metrics::METRICS;
use crate::obs;

/// What happened to a single input file.
#[derive(Debug)]
pub enum FileOutcome {
    Processed { file: String, table: WideTable },
    Skipped { file: String, reason: SkipReason },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Processed { file, .. } | FileOutcome::Skipped { file, .. } => file,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, FileOutcome::Processed { .. })
    }
}

/// Combined table plus the per-file bookkeeping of a reshape.
#[derive(Debug)]
pub struct ReshapeOutcome {
    pub combined: WideTable,
    pub processed: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Candidate files in `dir`, sorted by file name.
pub fn candidate_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TwinstatError::InputNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read and pivot one file. Never fails; failures become `Skipped`.
pub fn process_file(
    path: &Path,
    columns: &ColumnContract,
    aux_fields: &[String],
) -> FileOutcome {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let outcome =
        LongTable::read_csv(path).and_then(|long| pivot(&long, &file, columns, aux_fields));
    match outcome {
        Ok(table) => {
            METRICS.inc_files_processed();
            obs::emit_file_processed(&file, table.n_rows(), table.n_columns());
            FileOutcome::Processed { file, table }
        }
        Err(reason) => {
            METRICS.inc_files_skipped();
            obs::emit_file_skipped(&file, &reason);
            FileOutcome::Skipped { file, reason }
        }
    }
}

/// Pivot every `.csv` table in `dir` and stack the results.
///
/// # Errors
///
/// - `TwinstatError::InputNotFound` — `dir` does not exist.
/// - `TwinstatError::NoValidInput` — no file could be processed.
pub fn reshape_directory(
    dir: &Path,
    columns: &ColumnContract,
    aux_fields: &[String],
) -> Result<ReshapeOutcome> {
    reshape_files(&candidate_files(dir, "csv")?, dir, columns, aux_fields)
}

fn reshape_files(
    files: &[PathBuf],
    dir: &Path,
    columns: &ColumnContract,
    aux_fields: &[String],
) -> Result<ReshapeOutcome> {
    let outcomes: Vec<FileOutcome> = files
        .iter()
        .map(|path| process_file(path, columns, aux_fields))
        .collect();

    let mut tables = Vec::new();
    let mut processed = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Processed { file, table } => {
                processed.push(file);
                tables.push(table);
            }
            FileOutcome::Skipped { file, reason } => skipped.push((file, reason)),
        }
    }

    if tables.is_empty() {
        return Err(TwinstatError::NoValidInput {
            dir: dir.to_path_buf(),
            skipped: skipped.len(),
        });
    }

    Ok(ReshapeOutcome {
        combined: WideTable::concat(tables),
        processed,
        skipped,
    })
}

/// Reshape `cfg.input_dir` and write the combined table to `cfg.output`.
pub fn run_reshape(cfg: &ReshapeConfig) -> Result<ReshapeOutcome> {
    let _span = obs::PassSpan::enter("reshape");
    obs::emit_pass_started("reshape", &cfg.input_dir);

    let files = candidate_files(&cfg.input_dir, &cfg.extension)?;
    let outcome = reshape_files(&files, &cfg.input_dir, &cfg.columns, &cfg.aux_fields)?;

    outcome.combined.write_csv(&cfg.output)?;
    obs::emit_artifact_written("combined", &cfg.output);
    obs::emit_reshape_finished(
        outcome.processed.len(),
        outcome.skipped.len(),
        outcome.combined.n_rows(),
        outcome.combined.n_columns(),
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn candidates_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x\n").unwrap();
        fs::write(dir.path().join("notes.md"), "x\n").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = candidate_files(dir.path(), "csv").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn missing_directory_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = candidate_files(&dir.path().join("absent"), "csv").unwrap_err();
        assert!(matches!(err, TwinstatError::InputNotFound(_)));
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, [0xff, 0xfe, b',', b'\n', 0xff, b'\n']).unwrap();

        let outcome = process_file(&path, &ColumnContract::default(), &[]);
        assert_eq!(outcome.file(), "bad.csv");
        assert!(!outcome.is_processed());
    }
}
