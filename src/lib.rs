//! # refseq-assign
//!
//! A library for reconciling the reference sequence assignments of macromolecular
//! structure entities against the current `UniProt` release.
//!
//! Structure depositions carry `UniProt` accessions that were correct when the
//! entry was deposited. Accessions get merged, demerged and retired, so an
//! archive quickly accumulates secondary and obsolete identifiers.
//!
//! `refseq-assign` checks every accession attached to a polymer entity against a
//! precomputed match index and rewrites it to the canonical accession when that
//! can be done unambiguously. When it cannot, the entity falls back to the
//! residue-level alignments published by SIFTS.
//!
//! ## Features
//!
//! - **Primary passthrough**: canonical accessions are left untouched
//! - **Secondary remapping**: superseded accessions follow their replacement
//! - **Taxonomy tie-break**: demerged accessions are resolved by source organism
//! - **SIFTS fallback**: longest chain alignment per accession fills the gaps
//! - **Dry runs**: compute the outcome without modifying records
//!
//! ## Example
//!
//! ```rust,no_run
//! use refseq_assign::{EntityRecordProcessor, MatchIndexSnapshot, SiftsSummary};
//! use refseq_assign::core::entity::{EntityRecord, ReferenceAccessionEntry};
//! use std::path::Path;
//!
//! let index = MatchIndexSnapshot::load_from_file(Path::new("match_index.json")).unwrap();
//! let sifts = SiftsSummary::load_from_file(Path::new("sifts_summary.json")).unwrap();
//! let processor = EntityRecordProcessor::new(&index, &sifts);
//!
//! let mut record = EntityRecord::new("1ABC_1")
//!     .with_accessions(vec![ReferenceAccessionEntry::new("UniProt", "P14118", "PDB")])
//!     .with_chains(["A"])
//!     .with_tax_ids([9606]);
//!
//! let outcome = processor.filter(&mut record);
//! assert!(outcome.ok);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Match index and SIFTS alignment providers
//! - [`core`]: Entity records, match records and shared types
//! - [`matching`]: Accession resolution, SIFTS fallback and the record processor
//! - [`parsing`]: Entity record readers and writers
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::match_index::{MatchIndex, MatchIndexSnapshot};
pub use catalog::sifts::{AlignmentSource, SiftsSummary};
pub use core::entity::EntityRecord;
pub use core::types::*;
pub use matching::processor::{EntityRecordProcessor, FilterOutcome, RemapConfig};
pub use matching::resolver::{Resolution, Resolver};
