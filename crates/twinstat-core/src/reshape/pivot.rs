//! Long-to-wide pivot of one result table.
//!
//! The question columns are discovered from the data first (schema on read)
//! and fixed as a sorted column list before any output row is built.
//! Agents are emitted in sorted order.
//!
//! Auxiliary per-agent fields take the first non-empty value seen for each
//! agent. Constancy within an agent is assumed, not checked.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::table::{LongTable, WideTable};
use crate::config::{canonical_name, ColumnContract, SOURCE_FILE_COLUMN};
use crate::error::SkipReason;

struct AgentRow<'a> {
    answers: Vec<Option<&'a str>>,
    aux: Vec<Option<&'a str>>,
}

/// Pivot `table` into one row per agent and one column per question.
///
/// Output columns, in order: the agent column, the sorted question columns,
/// the provenance column, then each auxiliary field present in the input.
/// Column names go through the canonical rename table.
///
/// # Errors
///
/// - `SkipReason::MissingColumns` — a required column is absent.
/// - `SkipReason::ColumnCollision` — a question maps to the same output
///   column as another question, the agent, provenance or an aux field.
/// - `SkipReason::DuplicatePair` — an (agent, question) pair occurs twice.
pub fn pivot(
    table: &LongTable,
    source_file: &str,
    columns: &ColumnContract,
    aux_fields: &[String],
) -> Result<WideTable, SkipReason> {
    let missing = table.missing_columns(&columns.required());
    if !missing.is_empty() {
        return Err(SkipReason::MissingColumns(missing));
    }
    // Checked just above.
    let (Some(agent_col), Some(question_col), Some(answer_col)) = (
        table.column_index(&columns.agent),
        table.column_index(&columns.question),
        table.column_index(&columns.answer),
    ) else {
        return Err(SkipReason::MissingColumns(Vec::new()));
    };

    let mut aux_cols: Vec<(&str, usize)> = Vec::new();
    for field in aux_fields {
        if field == &columns.agent || aux_cols.iter().any(|(name, _)| name == field) {
            continue;
        }
        if let Some(idx) = table.column_index(field) {
            aux_cols.push((field.as_str(), idx));
        }
    }

    let questions: Vec<&str> = table
        .rows()
        .iter()
        .map(|row| row[question_col].as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let question_pos: HashMap<&str, usize> =
        questions.iter().enumerate().map(|(i, q)| (*q, i)).collect();

    let mut header = Vec::with_capacity(questions.len() + aux_cols.len() + 2);
    header.push(canonical_name(&columns.agent).to_string());
    header.extend(questions.iter().map(|q| canonical_name(q).to_string()));
    header.push(SOURCE_FILE_COLUMN.to_string());
    header.extend(aux_cols.iter().map(|(name, _)| canonical_name(name).to_string()));
    check_unique(&header)?;

    let mut agents: BTreeMap<&str, AgentRow> = BTreeMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for row in table.rows() {
        let agent = row[agent_col].as_str();
        let question = row[question_col].as_str();
        if !seen.insert((agent, question)) {
            return Err(SkipReason::DuplicatePair {
                agent: agent.to_string(),
                question: question.to_string(),
            });
        }

        let entry = agents.entry(agent).or_insert_with(|| AgentRow {
            answers: vec![None; questions.len()],
            aux: vec![None; aux_cols.len()],
        });
        entry.answers[question_pos[question]] = non_empty(&row[answer_col]);
        for (slot, (_, idx)) in entry.aux.iter_mut().zip(&aux_cols) {
            if slot.is_none() {
                *slot = non_empty(&row[*idx]);
            }
        }
    }

    let mut wide = WideTable::new(header);
    for (agent, row) in agents {
        let mut cells = Vec::with_capacity(wide.n_columns());
        cells.push(Some(agent.to_string()));
        cells.extend(row.answers.into_iter().map(|a| a.map(str::to_string)));
        cells.push(Some(source_file.to_string()));
        cells.extend(row.aux.into_iter().map(|a| a.map(str::to_string)));
        wide.push_row(cells);
    }
    Ok(wide)
}

/// Every output column must be distinct, or one value would overwrite
/// another when tables are aligned by name.
fn check_unique(header: &[String]) -> Result<(), SkipReason> {
    let mut names = HashSet::with_capacity(header.len());
    for name in header {
        if !names.insert(name.as_str()) {
            return Err(SkipReason::ColumnCollision {
                column: name.clone(),
            });
        }
    }
    Ok(())
}

fn non_empty(cell: &str) -> Option<&str> {
    (!cell.is_empty()).then_some(cell)
}
