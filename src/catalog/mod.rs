//! Read-only lookup providers consumed by the remapping.
//!
//! Two providers are needed to reconcile an entity's reference assignments:
//!
//! - [`MatchIndex`]: classifies an accession as primary (canonical), secondary
//!   (superseded, with candidate replacements) or unmatched
//! - [`AlignmentSource`]: residue-level SIFTS alignments of a structure's chains
//!   to reference sequences, used when the match index is inconclusive
//!
//! Both are traits so the remapping can be driven by any backing store. The
//! in-memory snapshots [`MatchIndexSnapshot`] and [`SiftsSummary`] are loaded
//! from JSON files, optionally gzip-compressed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use refseq_assign::catalog::match_index::{MatchIndex, MatchIndexSnapshot};
//! use refseq_assign::catalog::summary::summarize;
//! use std::path::Path;
//!
//! let index = MatchIndexSnapshot::load_from_file(Path::new("match_index.json.gz")).unwrap();
//! let summary = summarize(&index);
//! println!("{} primary, {} secondary", summary.primary, summary.secondary);
//! ```
//!
//! [`MatchIndex`]: match_index::MatchIndex
//! [`MatchIndexSnapshot`]: match_index::MatchIndexSnapshot
//! [`AlignmentSource`]: sifts::AlignmentSource
//! [`SiftsSummary`]: sifts::SiftsSummary

pub mod match_index;
pub mod sifts;
pub mod summary;
