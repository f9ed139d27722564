use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::catalog::match_index::MatchIndexSnapshot;
use crate::catalog::sifts::SiftsSummary;
use crate::cli::OutputFormat;
use crate::core::types::RemapMode;
use crate::matching::processor::{
    EntityRecordProcessor, FieldStats, RemapConfig, DEFAULT_EXCLUDED_DATABASE,
    DEFAULT_PROVENANCE, DEFAULT_REFERENCE_DATABASE,
};
use crate::parsing::records::{read_records, RecordWriter};

#[derive(Args)]
pub struct RemapArgs {
    /// Entity records (JSON lines or JSON array, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Match index JSON file
    #[arg(long, required = true)]
    pub match_index: PathBuf,

    /// SIFTS summary JSON file used when the match index is inconclusive
    #[arg(long, required = true)]
    pub sifts: PathBuf,

    /// Output file for remapped records (JSON lines); stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compute the remapping but write the records out unchanged
    #[arg(long)]
    pub dry_run: bool,

    /// Canonical reference sequence database
    #[arg(long, default_value = DEFAULT_REFERENCE_DATABASE)]
    pub reference_database: String,

    /// Provenance trusted for remapping (repeatable)
    #[arg(long = "provenance", default_value = DEFAULT_PROVENANCE)]
    pub provenances: Vec<String>,

    /// Database whose entries are dropped (repeatable)
    #[arg(long = "exclude", default_value = DEFAULT_EXCLUDED_DATABASE)]
    pub excluded: Vec<String>,
}

/// Totals over one remap run
#[derive(Debug, Default, Serialize)]
struct RunTotals {
    records: usize,
    failed: usize,
    malformed: usize,
    accessions: FieldStats,
    alignments: FieldStats,
    accessions_removed: usize,
    alignments_removed: usize,
}

/// Execute remap subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RemapArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = MatchIndexSnapshot::load_from_file(&args.match_index)
        .with_context(|| format!("loading {}", args.match_index.display()))?;
    let sifts = SiftsSummary::load_from_file(&args.sifts)
        .with_context(|| format!("loading {}", args.sifts.display()))?;

    if verbose {
        eprintln!(
            "Loaded match index with {} accessions and SIFTS summary with {} structures",
            index.len(),
            sifts.len()
        );
    }

    let mode = if args.dry_run {
        RemapMode::DryRun
    } else {
        RemapMode::Apply
    };
    let config = RemapConfig::default()
        .with_reference_database(&args.reference_database)
        .with_provenance_allow_list(args.provenances.clone())
        .with_exclusion_list(args.excluded.clone())
        .with_mode(mode);
    let processor = EntityRecordProcessor::with_config(&index, &sifts, config);

    let mut writer = match &args.output {
        Some(path) => RecordWriter::create(path)?,
        None => RecordWriter::stdout(),
    };

    let mut totals = RunTotals::default();
    for item in read_records(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?
    {
        let item = item?;
        totals.records += 1;
        match item.record {
            Ok(mut record) => {
                let outcome = processor.filter(&mut record);
                if !outcome.ok {
                    totals.failed += 1;
                }
                if let Some(stats) = &outcome.stats.accessions {
                    totals.accessions.merge(stats);
                    totals.accessions_removed += usize::from(stats.removed);
                }
                if let Some(stats) = &outcome.stats.alignments {
                    totals.alignments.merge(stats);
                    totals.alignments_removed += usize::from(stats.removed);
                }
                writer.write_record(&record)?;
            }
            Err(_) => {
                totals.malformed += 1;
                writer.write_raw(&item.raw)?;
            }
        }
    }
    writer.finish()?;

    match format {
        OutputFormat::Text => print_text_totals(&totals, args.dry_run),
        OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&totals)?),
        OutputFormat::Tsv => print_tsv_totals(&totals),
    }

    Ok(())
}

fn print_text_totals(totals: &RunTotals, dry_run: bool) {
    eprintln!(
        "Processed {} records{}",
        totals.records,
        if dry_run { " (dry run, records unchanged)" } else { "" }
    );
    if totals.malformed > 0 {
        eprintln!("  Malformed (passed through): {}", totals.malformed);
    }
    if totals.failed > 0 {
        eprintln!("  Failed: {}", totals.failed);
    }
    for (name, stats, removed) in [
        ("Accessions", &totals.accessions, totals.accessions_removed),
        ("Alignments", &totals.alignments, totals.alignments_removed),
    ] {
        eprintln!(
            "  {name}: {} canonical, {} remapped, {} excluded, {} unresolved, {} from SIFTS, {removed} fields removed",
            stats.canonical, stats.remapped, stats.excluded, stats.unresolved, stats.fallback,
        );
    }
}

fn print_tsv_totals(totals: &RunTotals) {
    eprintln!("field\tcanonical\tremapped\texcluded\tunresolved\tfallback\tremoved");
    for (name, stats, removed) in [
        ("accessions", &totals.accessions, totals.accessions_removed),
        ("alignments", &totals.alignments, totals.alignments_removed),
    ] {
        eprintln!(
            "{name}\t{}\t{}\t{}\t{}\t{}\t{removed}",
            stats.canonical, stats.remapped, stats.excluded, stats.unresolved, stats.fallback,
        );
    }
}
