use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::catalog::match_index::{MatchIndex, MatchIndexSnapshot};
use crate::cli::OutputFormat;
use crate::core::entity::ReferenceAccessionEntry;
use crate::core::types::{MatchClass, TaxId, TaxonomyIds};
use crate::matching::processor::{RemapConfig, DEFAULT_PROVENANCE, DEFAULT_REFERENCE_DATABASE};
use crate::matching::resolver::{Resolution, Resolver};
use crate::utils::validation::is_valid_uniprot_accession;

#[derive(Args)]
pub struct LookupArgs {
    /// Accession to resolve
    #[arg(required = true)]
    pub accession: String,

    /// Match index JSON file
    #[arg(long, required = true)]
    pub match_index: PathBuf,

    /// NCBI taxonomy id of the source organism (repeatable)
    #[arg(long = "tax-id")]
    pub tax_ids: Vec<u32>,

    /// Database the accession belongs to
    #[arg(long, default_value = DEFAULT_REFERENCE_DATABASE)]
    pub database: String,

    /// Provenance of the assignment
    #[arg(long, default_value = DEFAULT_PROVENANCE)]
    pub provenance: String,
}

/// Execute lookup subcommand
///
/// # Errors
///
/// Returns an error if the match index cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LookupArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !is_valid_uniprot_accession(&args.accession) {
        warn!(accession = %args.accession, "Not a UniProt-style accession");
    }

    let index = MatchIndexSnapshot::load_from_file(&args.match_index)
        .with_context(|| format!("loading {}", args.match_index.display()))?;

    let config = RemapConfig::default().with_reference_database(&args.database);
    let resolver = Resolver::new(&index, &config);

    let tax_ids: TaxonomyIds = args.tax_ids.iter().copied().map(TaxId::from).collect();
    let mut entry = ReferenceAccessionEntry::new(&args.database, &args.accession, &args.provenance);
    let resolution = resolver.resolve("lookup", &mut entry, &tax_ids);

    let class = match index.lookup(&args.accession) {
        Ok(Some(record)) => Some(record.matched),
        _ => None,
    };

    match format {
        OutputFormat::Text => print_text_lookup(&args, class, &resolution, &entry, verbose),
        OutputFormat::Json => print_json_lookup(&args, class, &resolution, &entry)?,
        OutputFormat::Tsv => print_tsv_lookup(&args, class, &resolution, &entry),
    }

    Ok(())
}

fn print_text_lookup(
    args: &LookupArgs,
    class: Option<MatchClass>,
    resolution: &Resolution,
    entry: &ReferenceAccessionEntry,
    verbose: bool,
) {
    println!("Accession: {}", args.accession);
    match class {
        Some(class) => println!("Match class: {class}"),
        None => println!("Match class: not in index"),
    }
    println!("Resolution: {resolution}");
    if resolution.is_matched() {
        println!("Canonical accession: {}", entry.database_accession);
    }
    if verbose && !args.tax_ids.is_empty() {
        let ids: Vec<String> = args.tax_ids.iter().map(ToString::to_string).collect();
        println!("Taxonomy ids: {}", ids.join(", "));
    }
}

fn print_json_lookup(
    args: &LookupArgs,
    class: Option<MatchClass>,
    resolution: &Resolution,
    entry: &ReferenceAccessionEntry,
) -> anyhow::Result<()> {
    let reason = match resolution {
        Resolution::Unresolved(reason) => Some(reason.to_string()),
        _ => None,
    };
    let output = serde_json::json!({
        "accession": args.accession,
        "database": args.database,
        "provenance": args.provenance,
        "tax_ids": args.tax_ids,
        "match_class": class.map(|c| c.to_string()),
        "resolution": resolution.label(),
        "canonical_accession": resolution.is_matched().then(|| entry.database_accession.clone()),
        "reason": reason,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_lookup(
    args: &LookupArgs,
    class: Option<MatchClass>,
    resolution: &Resolution,
    entry: &ReferenceAccessionEntry,
) {
    println!("accession\tmatch_class\tresolution\tcanonical_accession");
    println!(
        "{}\t{}\t{}\t{}",
        args.accession,
        class.map_or_else(|| "-".to_string(), |c| c.to_string()),
        resolution.label(),
        if resolution.is_matched() {
            entry.database_accession.as_str()
        } else {
            "-"
        }
    );
}
