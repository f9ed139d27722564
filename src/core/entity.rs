use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::types::{TaxId, TaxonomyIds};

/// A polymer entity document carrying reference sequence assignments.
///
/// Only the members read or written by the remapping are typed; every other
/// member is kept in `other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Structure and entity composite key (e.g. `1ABC_1`)
    #[serde(rename = "rcsb_id")]
    pub entity_key: String,

    #[serde(
        rename = "rcsb_entity_container_identifiers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub container_identifiers: Option<ContainerIdentifiers>,

    #[serde(
        rename = "rcsb_polymer_entity_align",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alignments: Option<Vec<AlignmentEntry>>,

    #[serde(
        rename = "rcsb_entity_source_organism",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_organisms: Option<Vec<SourceOrganism>>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerIdentifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_sequence_identifiers: Option<Vec<ReferenceAccessionEntry>>,

    /// Author chain identifiers of the instances of this entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_asym_ids: Option<Vec<String>>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOrganism {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncbi_taxonomy_id: Option<TaxId>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A cross-reference from an entity to a sequence database accession
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAccessionEntry {
    pub database_name: String,
    pub database_accession: String,
    pub provenance_source: String,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ReferenceAccessionEntry {
    pub fn new(
        database_name: impl Into<String>,
        database_accession: impl Into<String>,
        provenance_source: impl Into<String>,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            database_accession: database_accession.into(),
            provenance_source: provenance_source.into(),
            other: Map::new(),
        }
    }
}

/// An alignment of the entity sequence to a reference database sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEntry {
    pub reference_database_name: String,
    pub reference_database_accession: String,
    pub provenance_code: String,
    #[serde(default)]
    pub aligned_regions: Vec<AlignedRegion>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AlignmentEntry {
    pub fn new(
        reference_database_name: impl Into<String>,
        reference_database_accession: impl Into<String>,
        provenance_code: impl Into<String>,
    ) -> Self {
        Self {
            reference_database_name: reference_database_name.into(),
            reference_database_accession: reference_database_accession.into(),
            provenance_code: provenance_code.into(),
            aligned_regions: Vec::new(),
            other: Map::new(),
        }
    }

    #[must_use]
    pub fn with_regions(mut self, regions: Vec<AlignedRegion>) -> Self {
        self.aligned_regions = regions;
        self
    }
}

/// One gap-free aligned segment (1-based sequence positions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedRegion {
    pub ref_beg_seq_id: u32,
    pub entity_beg_seq_id: u32,
    pub length: u32,
}

impl AlignedRegion {
    pub fn new(ref_beg_seq_id: u32, entity_beg_seq_id: u32, length: u32) -> Self {
        Self {
            ref_beg_seq_id,
            entity_beg_seq_id,
            length,
        }
    }
}

impl EntityRecord {
    pub fn new(entity_key: impl Into<String>) -> Self {
        Self {
            entity_key: entity_key.into(),
            container_identifiers: None,
            alignments: None,
            source_organisms: None,
            other: Map::new(),
        }
    }

    #[must_use]
    pub fn with_accessions(mut self, entries: Vec<ReferenceAccessionEntry>) -> Self {
        self.container_identifiers
            .get_or_insert_with(ContainerIdentifiers::default)
            .reference_sequence_identifiers = Some(entries);
        self
    }

    #[must_use]
    pub fn with_alignments(mut self, entries: Vec<AlignmentEntry>) -> Self {
        self.alignments = Some(entries);
        self
    }

    #[must_use]
    pub fn with_chains<S: Into<String>>(mut self, chains: impl IntoIterator<Item = S>) -> Self {
        self.container_identifiers
            .get_or_insert_with(ContainerIdentifiers::default)
            .auth_asym_ids = Some(chains.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_tax_ids(mut self, tax_ids: impl IntoIterator<Item = u32>) -> Self {
        self.source_organisms = Some(
            tax_ids
                .into_iter()
                .map(|id| SourceOrganism {
                    ncbi_taxonomy_id: Some(TaxId(id)),
                    other: Map::new(),
                })
                .collect(),
        );
        self
    }

    /// Reference accession entries, if the field is present
    pub fn accessions(&self) -> Option<&Vec<ReferenceAccessionEntry>> {
        self.container_identifiers
            .as_ref()
            .and_then(|c| c.reference_sequence_identifiers.as_ref())
    }

    /// Author chain identifiers (empty when absent)
    pub fn chain_ids(&self) -> &[String] {
        self.container_identifiers
            .as_ref()
            .and_then(|c| c.auth_asym_ids.as_deref())
            .unwrap_or(&[])
    }

    /// Distinct taxonomy identifiers over all source organisms
    pub fn taxonomy_ids(&self) -> TaxonomyIds {
        self.source_organisms
            .iter()
            .flatten()
            .filter_map(|o| o.ncbi_taxonomy_id)
            .collect()
    }

    /// Store the accession list; an empty list removes the field
    pub fn set_accessions(&mut self, entries: Vec<ReferenceAccessionEntry>) {
        if entries.is_empty() {
            if let Some(c) = self.container_identifiers.as_mut() {
                c.reference_sequence_identifiers = None;
            }
        } else {
            self.container_identifiers
                .get_or_insert_with(ContainerIdentifiers::default)
                .reference_sequence_identifiers = Some(entries);
        }
    }

    /// Store the alignment list; an empty list removes the field
    pub fn set_alignments(&mut self, entries: Vec<AlignmentEntry>) {
        self.alignments = if entries.is_empty() {
            None
        } else {
            Some(entries)
        };
    }
}
