use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::catalog::match_index::MatchIndexSnapshot;
use crate::catalog::summary::{summarize, AssignmentSummary};
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct SummaryArgs {
    /// Match index JSON file
    #[arg(long, required = true)]
    pub match_index: PathBuf,
}

/// Execute summary subcommand
///
/// # Errors
///
/// Returns an error if the match index cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SummaryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = MatchIndexSnapshot::load_from_file(&args.match_index)
        .with_context(|| format!("loading {}", args.match_index.display()))?;
    let summary = summarize(&index);

    match format {
        OutputFormat::Text => print_text_summary(&summary, verbose),
        OutputFormat::Json => print_json_summary(&summary, &args)?,
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(summary: &AssignmentSummary, verbose: bool) {
    println!("Match index: {} accessions", summary.total());
    println!("  Primary:   {}", summary.primary);
    println!("  Secondary: {}", summary.secondary);
    println!("  Unmatched: {}", summary.unmatched);
    if verbose {
        println!(
            "  Canonical fraction: {:.1}%",
            summary.primary_fraction() * 100.0
        );
    }
}

fn print_json_summary(summary: &AssignmentSummary, args: &SummaryArgs) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "match_index": args.match_index.display().to_string(),
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "primary": summary.primary,
        "secondary": summary.secondary,
        "none": summary.unmatched,
        "total": summary.total(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(summary: &AssignmentSummary) {
    println!("class\tcount");
    println!("primary\t{}", summary.primary);
    println!("secondary\t{}", summary.secondary);
    println!("none\t{}", summary.unmatched);
}
