//! Core data types for reference sequence assignment.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`EntityRecord`]: A polymer entity document with its reference assignments
//! - [`ReferenceAccessionEntry`]: A database cross-reference of an entity
//! - [`AlignmentEntry`]: An alignment of an entity to a reference sequence
//! - [`MatchRecord`]: Classification of an accession in the match index
//! - [`MatchClass`], [`TaxId`], [`RemapMode`]: Shared enums and identifiers
//!
//! ## Field Mapping
//!
//! | Type | Database | Accession | Provenance |
//! |------|----------|-----------|------------|
//! | `ReferenceAccessionEntry` | `database_name` | `database_accession` | `provenance_source` |
//! | `AlignmentEntry` | `reference_database_name` | `reference_database_accession` | `provenance_code` |
//!
//! [`EntityRecord`]: entity::EntityRecord
//! [`ReferenceAccessionEntry`]: entity::ReferenceAccessionEntry
//! [`AlignmentEntry`]: entity::AlignmentEntry
//! [`MatchRecord`]: match_record::MatchRecord
//! [`MatchClass`]: types::MatchClass
//! [`TaxId`]: types::TaxId
//! [`RemapMode`]: types::RemapMode

pub mod entity;
pub mod match_record;
pub mod types;
