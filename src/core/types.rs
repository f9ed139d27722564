use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// NCBI taxonomy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(pub u32);

impl TaxId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Distinct taxonomy identifiers of the source organisms of one entity
pub type TaxonomyIds = BTreeSet<TaxId>;

/// Classification of an accession against the current reference database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    /// The accession is current and canonical
    Primary,
    /// The accession has been superseded by one or more canonical accessions
    Secondary,
    /// The accession is not present in the reference database
    #[serde(rename = "none")]
    #[default]
    Unmatched,
    /// Any classification this crate does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MatchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
            Self::Unmatched => write!(f, "none"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Whether the processor writes its result back to the caller's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemapMode {
    /// Mutate the record in place
    #[default]
    Apply,
    /// Compute the remapping on a private copy and leave the record untouched
    DryRun,
}

/// The two reference fields of an entity record handled by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    /// `rcsb_entity_container_identifiers.reference_sequence_identifiers`
    Accessions,
    /// `rcsb_polymer_entity_align`
    Alignments,
}

impl std::fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accessions => write!(f, "reference_sequence_identifiers"),
            Self::Alignments => write!(f, "rcsb_polymer_entity_align"),
        }
    }
}
