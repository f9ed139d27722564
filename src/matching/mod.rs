//! Reference sequence remapping and fallback policy.
//!
//! This module provides the core reconciliation logic:
//!
//! - [`Resolver`]: Decides the fate of a single accession or alignment entry
//! - [`EntityRecordProcessor`]: Applies the resolver across a whole entity record
//! - [`fallback_entries`]: Builds replacement entries from the alignment source
//!
//! ## Resolution Rules
//!
//! Each entry is checked in order:
//!
//! 1. **Excluded database**: entries from an excluded database (`PDB`) are dropped
//! 2. **Trusted reference entry**: `UniProt` entries assigned by `PDB` are looked up
//!    in the match index
//!    - *primary*: already canonical, kept unchanged
//!    - *secondary* with one candidate: rewritten to that candidate
//!    - *secondary* with several candidates: rewritten only if the entity has a
//!      single taxonomy id shared by exactly one candidate
//! 3. **Anything else**: unresolved
//!
//! ## List Policy
//!
//! Unresolved entries are replaced by `SIFTS` entries from the alignment source.
//! A field whose list ends up empty is removed from the record, which marks the
//! entity's reference mapping as incomplete.
//!
//! ## Example
//!
//! ```rust,no_run
//! use refseq_assign::catalog::match_index::MatchIndexSnapshot;
//! use refseq_assign::catalog::sifts::SiftsSummary;
//! use refseq_assign::matching::processor::EntityRecordProcessor;
//! use refseq_assign::parsing::records::read_records;
//! use std::path::Path;
//!
//! let index = MatchIndexSnapshot::load_from_file(Path::new("match_index.json")).unwrap();
//! let sifts = SiftsSummary::load_from_file(Path::new("sifts_summary.json")).unwrap();
//! let processor = EntityRecordProcessor::new(&index, &sifts);
//!
//! for item in read_records(Path::new("entities.jsonl")).unwrap() {
//!     if let Ok(mut record) = item.unwrap().record {
//!         let outcome = processor.filter(&mut record);
//!         println!("{}: ok={}", record.entity_key, outcome.ok);
//!     }
//! }
//! ```
//!
//! [`Resolver`]: resolver::Resolver
//! [`EntityRecordProcessor`]: processor::EntityRecordProcessor
//! [`fallback_entries`]: fallback::fallback_entries

pub mod fallback;
pub mod processor;
pub mod resolver;
