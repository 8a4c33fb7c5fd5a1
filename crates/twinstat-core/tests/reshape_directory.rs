//! End-to-end tests for the wide-format reshaper.

use std::fs;
use std::path::Path;

use twinstat_core::{
    reshape_directory, run_reshape, ColumnContract, LongTable, ReshapeConfig, SkipReason,
    TwinstatError,
};

fn simple_contract() -> ColumnContract {
    ColumnContract::new("agent_id", "question_id", "answer")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

/// Long-format survey export in the column layout of the survey runner.
fn survey_export(agents: &[(&str, f64)], questions: &[&str]) -> String {
    let mut out = String::from(
        "agent.prolific_pid,scenario.question_name,answer.question,agent.extraversion_score,model.model\n",
    );
    for (agent, extraversion) in agents {
        for (i, question) in questions.iter().enumerate() {
            out.push_str(&format!(
                "{agent},{question},{},{extraversion},gpt-4o\n",
                (i % 5) + 1
            ));
        }
    }
    out
}

#[test]
fn skips_file_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "file1.csv", "agent_id,question_id,answer\na1,q1,3\na1,q2,4\n");
    write(dir.path(), "file2.csv", "agent_id,answer\na2,5\n");

    let out = reshape_directory(dir.path(), &simple_contract(), &[]).expect("reshape");
    assert_eq!(out.processed, vec!["file1.csv"]);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].0, "file2.csv");
    assert!(matches!(out.skipped[0].1, SkipReason::MissingColumns(_)));

    let table = &out.combined;
    assert_eq!(table.n_rows(), 1);
    assert_eq!(table.get(0, "agent_id"), Some("a1"));
    assert_eq!(table.get(0, "q1"), Some("3"));
    assert_eq!(table.get(0, "q2"), Some("4"));
    assert_eq!(table.get(0, "source_file"), Some("file1.csv"));
}

#[test]
fn no_processable_files_is_no_valid_input() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "only.csv", "agent_id,answer\na1,3\n");
    write(dir.path(), "readme.txt", "not a table");

    let err = reshape_directory(dir.path(), &simple_contract(), &[]).unwrap_err();
    assert!(matches!(err, TwinstatError::NoValidInput { skipped: 1, .. }));
    assert!(err.to_string().contains("no valid input"));
}

#[test]
fn empty_directory_is_no_valid_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = reshape_directory(dir.path(), &simple_contract(), &[]).unwrap_err();
    assert!(matches!(err, TwinstatError::NoValidInput { skipped: 0, .. }));
}

#[test]
fn missing_directory_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let err =
        reshape_directory(&dir.path().join("nope"), &simple_contract(), &[]).unwrap_err();
    assert!(matches!(err, TwinstatError::InputNotFound(_)));
}

#[test]
fn duplicate_pair_skips_only_that_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "agent_id,question_id,answer\na1,q1,3\na1,q1,2\n");
    write(dir.path(), "b.csv", "agent_id,question_id,answer\nb1,q1,1\n");

    let out = reshape_directory(dir.path(), &simple_contract(), &[]).expect("reshape");
    assert_eq!(out.processed, vec!["b.csv"]);
    assert!(matches!(
        out.skipped[0].1,
        SkipReason::DuplicatePair { ref agent, ref question } if agent == "a1" && question == "q1"
    ));
    assert_eq!(out.combined.n_rows(), 1);
}

#[test]
fn question_colliding_with_provenance_skips_only_that_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "agent_id,question_id,answer\na1,source_file,7\na1,q1,3\n");
    write(dir.path(), "b.csv", "agent_id,question_id,answer\nb1,q1,1\n");

    let out = reshape_directory(dir.path(), &simple_contract(), &[]).expect("reshape");
    assert_eq!(out.processed, vec!["b.csv"]);
    assert_eq!(out.skipped[0].0, "a.csv");
    assert!(matches!(
        out.skipped[0].1,
        SkipReason::ColumnCollision { ref column } if column == "source_file"
    ));
    assert_eq!(out.combined.n_rows(), 1);
    assert_eq!(out.combined.get(0, "source_file"), Some("b.csv"));
}

#[test]
fn row_and_column_counts_follow_agents_and_questions() {
    let dir = tempfile::tempdir().unwrap();
    let agents = [("p1", 3.5), ("p2", 2.0), ("p3", 4.25), ("p4", 1.0)];
    let questions = ["p_1_open_item_1", "p_1_open_item_2", "p_2_extra_item_1"];
    write(dir.path(), "results_1_gpt_4o.csv", &survey_export(&agents, &questions));

    let cfg = ReshapeConfig::new(dir.path(), dir.path().join("out").join("wide.csv"));
    let out = run_reshape(&cfg).expect("reshape");
    let table = &out.combined;

    assert_eq!(table.n_rows(), agents.len());
    assert_eq!(
        table.columns(),
        &[
            "PROLIFIC_PID",
            "p_1_open_item_1",
            "p_1_open_item_2",
            "p_2_extra_item_1",
            "source_file",
            "extraversion_score",
        ]
    );
    assert_eq!(table.get(2, "PROLIFIC_PID"), Some("p3"));
    assert_eq!(table.get(2, "extraversion_score"), Some("4.25"));
    assert_eq!(table.get(2, "p_1_open_item_2"), Some("2"));
    assert!(table.column_index("model.model").is_none());
}

#[test]
fn combined_output_is_written_with_union_of_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("results");
    fs::create_dir(&input).unwrap();
    write(&input, "batch_1.csv", &survey_export(&[("p1", 1.5)], &["q_a", "q_b"]));
    write(&input, "batch_2.csv", &survey_export(&[("p2", 2.5)], &["q_b", "q_c"]));

    let output = dir.path().join("synthetic").join("wide").join("combined.csv");
    let cfg = ReshapeConfig::new(&input, &output);
    let out = run_reshape(&cfg).expect("reshape");
    assert_eq!(out.processed, vec!["batch_1.csv", "batch_2.csv"]);
    assert!(output.exists());

    let written = LongTable::read_csv(&output).expect("read back");
    assert_eq!(
        written.headers(),
        &["PROLIFIC_PID", "q_a", "q_b", "source_file", "extraversion_score", "q_c"]
    );
    assert_eq!(written.rows()[0], vec!["p1", "1", "2", "batch_1.csv", "1.5", ""]);
    assert_eq!(written.rows()[1], vec!["p2", "", "1", "batch_2.csv", "2.5", "2"]);
}

#[test]
fn custom_extension_selects_other_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "export.tsv.txt", "agent_id,question_id,answer\na1,q1,5\n");
    write(dir.path(), "ignored.csv", "agent_id,question_id,answer\nz9,q1,1\n");

    let mut cfg = ReshapeConfig::new(dir.path(), dir.path().join("wide.csv"))
        .with_columns(simple_contract())
        .with_aux_fields(Vec::<String>::new());
    cfg.extension = "txt".to_string();

    let out = run_reshape(&cfg).expect("reshape");
    assert_eq!(out.processed, vec!["export.tsv.txt"]);
    assert_eq!(out.combined.get(0, "agent_id"), Some("a1"));
}

#[test]
fn failed_run_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.csv", "agent_id\na1\n");
    let output = dir.path().join("out").join("wide.csv");

    let cfg = ReshapeConfig::new(dir.path(), &output).with_columns(simple_contract());
    let err = run_reshape(&cfg).unwrap_err();
    assert!(err.is_degenerate_input());
    assert!(!output.exists());
}
