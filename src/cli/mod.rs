//! Command-line interface for refseq-assign.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **remap**: Reconcile the reference assignments of a file of entity records
//! - **summary**: Count primary, secondary and unmatched accessions in a match index
//! - **lookup**: Show how a single accession would be resolved
//!
//! ## Usage
//!
//! ```text
//! # Remap a batch of entity records
//! refseq-assign remap entities.jsonl --match-index match_index.json.gz \
//!     --sifts sifts_summary.json.gz -o remapped.jsonl
//!
//! # See what would change without writing the result back
//! refseq-assign remap entities.jsonl --match-index idx.json --sifts sifts.json --dry-run
//!
//! # Match index summary as JSON
//! refseq-assign summary --match-index match_index.json.gz --format json
//!
//! # Resolve one accession for a human entity
//! refseq-assign lookup P14118 --match-index match_index.json --tax-id 9606
//! ```

use clap::{Parser, Subcommand};

pub mod lookup;
pub mod remap;
pub mod summary;

#[derive(Parser)]
#[command(name = "refseq-assign")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Reconcile structure-assigned sequence accessions against UniProt")]
#[command(
    long_about = "refseq-assign reconciles the UniProt accessions and alignments that a structure deposition pipeline attached to polymer entities.\n\nEach accession is checked against a precomputed match index:\n- Canonical (primary) accessions are kept\n- Superseded (secondary) accessions are remapped when the replacement is unambiguous\n- Everything else falls back to SIFTS residue-level alignments"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remap the reference assignments of entity records
    Remap(remap::RemapArgs),

    /// Summarize a match index
    Summary(summary::SummaryArgs),

    /// Resolve a single accession
    Lookup(lookup::LookupArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
