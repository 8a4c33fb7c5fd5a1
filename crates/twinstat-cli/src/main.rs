//! Twinstat CLI
//!
//! The `twinstat` command runs the two batch passes of the survey analysis
//! workflow.
//!
//! ## Commands
//!
//! - `correct`: FDR-correct a pooled family of named p-value groups
//! - `reshape`: pivot long-format result tables into one wide table

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use twinstat_core::config::{
    DEFAULT_AGENT_COLUMN, DEFAULT_ANSWER_COLUMN, DEFAULT_FDR_DIR, DEFAULT_PVALUES_FILE,
    DEFAULT_QUESTION_COLUMN,
};
use twinstat_core::{
    ColumnContract, CorrectionConfig, CorrectionRun, ReshapeConfig, ReshapeOutcome,
    DEFAULT_ALPHA, DEFAULT_AUX_FIELDS, METRICS,
};

#[derive(Parser)]
#[command(name = "twinstat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Post-processing for synthetic-twin survey results", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(
        long,
        global = true,
        env = "TWINSTAT_LOG_JSON",
        value_parser = BoolishValueParser::new()
    )]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one Benjamini–Hochberg correction across every p-value group
    Correct(CorrectArgs),

    /// Pivot a directory of long-format result tables into one wide table
    Reshape(ReshapeArgs),
}

#[derive(Args)]
struct CorrectArgs {
    /// JSON document mapping group names to raw p-values
    #[arg(short, long, env = "TWINSTAT_PVALUES", default_value = DEFAULT_PVALUES_FILE)]
    input: PathBuf,

    /// Directory for the adjusted family and the summary
    #[arg(short, long, env = "TWINSTAT_FDR_DIR", default_value = DEFAULT_FDR_DIR)]
    output_dir: PathBuf,

    /// Significance level for the FDR procedure
    #[arg(short, long, env = "TWINSTAT_ALPHA", default_value_t = DEFAULT_ALPHA)]
    alpha: f64,

    /// Fail on the first invalid group instead of skipping it
    #[arg(long, env = "TWINSTAT_STRICT", value_parser = BoolishValueParser::new())]
    strict: bool,
}

#[derive(Args)]
struct ReshapeArgs {
    /// Directory containing long-format result tables
    #[arg(short, long, env = "TWINSTAT_RESULTS_DIR")]
    input_dir: PathBuf,

    /// Path of the combined wide-format CSV
    #[arg(short, long, env = "TWINSTAT_WIDE_OUTPUT")]
    output: PathBuf,

    /// Column holding the agent identifier
    #[arg(long, default_value = DEFAULT_AGENT_COLUMN)]
    agent_column: String,

    /// Column holding the question identifier
    #[arg(long, default_value = DEFAULT_QUESTION_COLUMN)]
    question_column: String,

    /// Column holding the answer value
    #[arg(long, default_value = DEFAULT_ANSWER_COLUMN)]
    answer_column: String,

    /// Per-agent field to carry onto each wide row (repeatable)
    #[arg(long = "aux-field", value_delimiter = ',')]
    aux_fields: Option<Vec<String>>,

    /// Extension of candidate files
    #[arg(long, default_value = "csv")]
    extension: String,
}

impl From<CorrectArgs> for CorrectionConfig {
    fn from(args: CorrectArgs) -> Self {
        Self {
            input: args.input,
            output_dir: args.output_dir,
            alpha: args.alpha,
            strict: args.strict,
        }
    }
}

impl From<ReshapeArgs> for ReshapeConfig {
    fn from(args: ReshapeArgs) -> Self {
        let aux_fields = args
            .aux_fields
            .unwrap_or_else(|| DEFAULT_AUX_FIELDS.iter().map(|s| s.to_string()).collect());
        let mut cfg = ReshapeConfig::new(args.input_dir, args.output)
            .with_columns(ColumnContract::new(
                args.agent_column,
                args.question_column,
                args.answer_column,
            ))
            .with_aux_fields(aux_fields);
        cfg.extension = args.extension;
        cfg
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    twinstat_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Correct(args) => cmd_correct(args.into()),
        Commands::Reshape(args) => cmd_reshape(args.into()),
    };
    METRICS.flush();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Correct the configured p-value family and write both artifacts.
fn cmd_correct(cfg: CorrectionConfig) -> Result<()> {
    let CorrectionRun {
        result,
        rejected_groups,
        persisted,
    } = twinstat_core::run_correction(&cfg)
        .with_context(|| format!("correction of {} failed", cfg.input.display()))?;

    for rejection in &rejected_groups {
        println!("Skipped group {:?}: {}", rejection.group, rejection.reason);
    }

    let summary = &result.summary;
    match summary.effective_fdr_threshold_raw {
        Some(threshold) => println!(
            "{}/{} tests significant at FDR {} (raw p <= {})",
            summary.n_significant, summary.n_tests, summary.alpha, threshold
        ),
        None => println!(
            "0/{} tests significant at FDR {}",
            summary.n_tests, summary.alpha
        ),
    }

    let (adjusted, summary_path) = persisted
        .into_result()
        .context("failed to write correction artifacts")?;
    println!("Adjusted p-values written: {}", adjusted.display());
    println!("Summary written: {}", summary_path.display());
    Ok(())
}

/// Reshape the configured results directory into one wide table.
fn cmd_reshape(cfg: ReshapeConfig) -> Result<()> {
    let ReshapeOutcome {
        combined,
        processed,
        skipped,
    } = twinstat_core::run_reshape(&cfg)
        .with_context(|| format!("reshape of {} failed", cfg.input_dir.display()))?;

    for (file, reason) in &skipped {
        println!("Skipped {}: {}", file, reason);
    }
    info!(processed = processed.len(), skipped = skipped.len(), "reshape complete");

    println!(
        "Successfully processed {} files, skipped {} files",
        processed.len(),
        skipped.len()
    );
    println!("Combined data saved to: {}", cfg.output.display());
    println!(
        "Final table shape: ({}, {})",
        combined.n_rows(),
        combined.n_columns()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn correct_defaults_match_pipeline_layout() {
        let cli = Cli::try_parse_from(["twinstat", "correct"]).unwrap();
        let Commands::Correct(args) = cli.command else {
            panic!("expected correct subcommand");
        };
        let cfg: CorrectionConfig = args.into();
        assert_eq!(cfg, CorrectionConfig::default());
    }

    #[test]
    fn reshape_flags_build_config() {
        let cli = Cli::try_parse_from([
            "twinstat",
            "reshape",
            "--input-dir",
            "results",
            "--output",
            "wide/combined.csv",
            "--agent-column",
            "agent_id",
            "--aux-field",
            "agent.openness_score,agent.neuroticism_score",
        ])
        .unwrap();
        let Commands::Reshape(args) = cli.command else {
            panic!("expected reshape subcommand");
        };
        let cfg: ReshapeConfig = args.into();
        assert_eq!(cfg.columns.agent, "agent_id");
        assert_eq!(cfg.columns.question, DEFAULT_QUESTION_COLUMN);
        assert_eq!(
            cfg.aux_fields,
            vec!["agent.openness_score", "agent.neuroticism_score"]
        );
        assert_eq!(cfg.extension, "csv");
    }

    #[test]
    fn reshape_without_aux_flag_uses_personality_scores() {
        let cli = Cli::try_parse_from([
            "twinstat", "reshape", "-i", "results", "-o", "out.csv",
        ])
        .unwrap();
        let Commands::Reshape(args) = cli.command else {
            panic!("expected reshape subcommand");
        };
        let cfg: ReshapeConfig = args.into();
        assert_eq!(cfg.aux_fields.len(), DEFAULT_AUX_FIELDS.len());
    }

    #[test]
    fn correct_end_to_end_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("all_pvals.json");
        std::fs::write(&input, r#"{"A": [0.01, 0.5, 0.2], "B": [0.04]}"#).unwrap();

        let cfg = CorrectionConfig {
            input,
            output_dir: dir.path().join("fdr_adjusted"),
            ..CorrectionConfig::default()
        };
        cmd_correct(cfg.clone()).unwrap();
        assert!(cfg.adjusted_path().exists());
        assert!(cfg.summary_path().exists());
    }

    #[test]
    fn correct_on_empty_family_errors_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("all_pvals.json");
        std::fs::write(&input, "{}").unwrap();

        let cfg = CorrectionConfig {
            input,
            output_dir: dir.path().join("fdr_adjusted"),
            ..CorrectionConfig::default()
        };
        let err = cmd_correct(cfg.clone()).unwrap_err();
        assert!(format!("{err:#}").contains("no data to correct"));
        assert!(!cfg.output_dir.exists());
    }
}
