use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

use crate::catalog::match_index::{IndexError, LookupError};
use crate::parsing::compression::open_reader;

/// One gap-free segment of a residue-level structure-to-sequence alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSpan {
    /// First aligned position in the reference database sequence
    pub db_seq_id_beg: u32,
    /// First aligned position in the entity sequence
    pub entity_seq_id_beg: u32,
    /// Number of aligned residues
    pub entity_align_length: u32,
}

impl AlignmentSpan {
    pub fn new(db_seq_id_beg: u32, entity_seq_id_beg: u32, entity_align_length: u32) -> Self {
        Self {
            db_seq_id_beg,
            entity_seq_id_beg,
            entity_align_length,
        }
    }
}

/// An alignment of one chain to one reference database accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftsAlignment {
    pub db_accession: String,
    #[serde(default)]
    pub segments: Vec<AlignmentSpan>,
}

impl SiftsAlignment {
    /// Total number of aligned residues over all segments
    pub fn aligned_length(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| u64::from(s.entity_align_length))
            .sum()
    }
}

/// Longest alignment spans keyed by (chain id, reference accession)
pub type LongestAlignments = BTreeMap<(String, String), Vec<AlignmentSpan>>;

/// Read-only source of residue-level alignments between structures and
/// reference sequences
pub trait AlignmentSource {
    /// For each (chain, accession) pair of the given chains, the spans of the
    /// longest alignment, ordered by entity position.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the source cannot answer for this structure.
    fn longest_alignments(
        &self,
        structure_id: &str,
        chain_ids: &[String],
    ) -> Result<LongestAlignments, LookupError>;
}

/// Chain alignments for one structure
pub type StructureAlignments = BTreeMap<String, Vec<SiftsAlignment>>;

/// In-memory SIFTS summary keyed by structure id
#[derive(Debug, Clone, Default)]
pub struct SiftsSummary {
    structures: HashMap<String, StructureAlignments>,
}

impl SiftsSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a summary from JSON (optionally gzipped)
    ///
    /// # Errors
    ///
    /// Returns `IndexError::ReadError` if the file cannot be opened or
    /// `IndexError::ParseError` if its content is not a valid summary.
    pub fn load_from_file(path: &Path) -> Result<Self, IndexError> {
        let reader = open_reader(path).map_err(|source| IndexError::ReadError {
            what: "SIFTS summary",
            source,
        })?;
        let data: HashMap<String, StructureAlignments> = serde_json::from_reader(reader)
            .map_err(|source| IndexError::ParseError {
                what: "SIFTS summary",
                source,
            })?;
        let summary = Self::from_data(data);
        debug!(
            path = %path.display(),
            structures = summary.len(),
            "Loaded SIFTS summary"
        );
        Ok(summary)
    }

    /// Parse a summary from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `IndexError::ParseError` if the JSON is not a valid summary.
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let data = serde_json::from_str(json).map_err(|source| IndexError::ParseError {
            what: "SIFTS summary",
            source,
        })?;
        Ok(Self::from_data(data))
    }

    fn from_data(data: HashMap<String, StructureAlignments>) -> Self {
        let mut summary = Self::new();
        for (structure_id, chains) in data {
            for (chain_id, alignments) in chains {
                for alignment in alignments {
                    summary.add_alignment(&structure_id, &chain_id, alignment);
                }
            }
        }
        summary
    }

    /// Add one chain alignment
    pub fn add_alignment(&mut self, structure_id: &str, chain_id: &str, alignment: SiftsAlignment) {
        self.structures
            .entry(structure_id.to_uppercase())
            .or_default()
            .entry(chain_id.to_string())
            .or_default()
            .push(alignment);
    }

    #[must_use]
    pub fn with_alignment(
        mut self,
        structure_id: &str,
        chain_id: &str,
        alignment: SiftsAlignment,
    ) -> Self {
        self.add_alignment(structure_id, chain_id, alignment);
        self
    }

    /// Number of structures in the summary
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Check if the summary is empty
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

impl AlignmentSource for SiftsSummary {
    fn longest_alignments(
        &self,
        structure_id: &str,
        chain_ids: &[String],
    ) -> Result<LongestAlignments, LookupError> {
        let mut result = LongestAlignments::new();
        let Some(chains) = self.structures.get(&structure_id.to_uppercase()) else {
            return Ok(result);
        };

        for chain_id in chain_ids {
            let Some(alignments) = chains.get(chain_id) else {
                continue;
            };

            // Strictly longer replaces, so the first alignment wins a tie
            let mut longest: BTreeMap<&str, &SiftsAlignment> = BTreeMap::new();
            for alignment in alignments {
                let best = longest
                    .entry(alignment.db_accession.as_str())
                    .or_insert(alignment);
                if alignment.aligned_length() > best.aligned_length() {
                    *best = alignment;
                }
            }

            for (accession, alignment) in longest {
                let mut spans = alignment.segments.clone();
                spans.sort_by_key(|s| s.entity_seq_id_beg);
                result.insert((chain_id.clone(), accession.to_string()), spans);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chains(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    fn alignment(accession: &str, spans: &[(u32, u32, u32)]) -> SiftsAlignment {
        SiftsAlignment {
            db_accession: accession.to_string(),
            segments: spans
                .iter()
                .map(|&(db, entity, len)| AlignmentSpan::new(db, entity, len))
                .collect(),
        }
    }

    #[test]
    fn test_longest_alignment_per_chain_and_accession() {
        let summary = SiftsSummary::new()
            .with_alignment("1abc", "A", alignment("P84098", &[(1, 1, 20)]))
            .with_alignment("1abc", "A", alignment("P84098", &[(1, 1, 50), (60, 55, 10)]))
            .with_alignment("1abc", "A", alignment("Q99999", &[(5, 1, 8)]))
            .with_alignment("1abc", "B", alignment("P84098", &[(1, 1, 30)]));

        let result = summary.longest_alignments("1ABC", &chains(&["A", "B"])).unwrap();
        assert_eq!(result.len(), 3);

        let spans = &result[&("A".to_string(), "P84098".to_string())];
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].entity_align_length, 50);
        assert_eq!(result[&("B".to_string(), "P84098".to_string())][0].entity_align_length, 30);
    }

    #[test]
    fn test_tie_keeps_first_alignment() {
        let summary = SiftsSummary::new()
            .with_alignment("2XYZ", "A", alignment("P1", &[(1, 1, 10)]))
            .with_alignment("2XYZ", "A", alignment("P1", &[(100, 1, 10)]));

        let result = summary.longest_alignments("2xyz", &chains(&["A"])).unwrap();
        assert_eq!(result[&("A".to_string(), "P1".to_string())][0].db_seq_id_beg, 1);
    }

    #[test]
    fn test_unknown_structure_or_chain() {
        let summary = SiftsSummary::new().with_alignment("2XYZ", "A", alignment("P1", &[(1, 1, 10)]));

        assert!(summary.longest_alignments("9ZZZ", &chains(&["A"])).unwrap().is_empty());
        assert!(summary.longest_alignments("2XYZ", &chains(&["C"])).unwrap().is_empty());
        assert!(summary.longest_alignments("2XYZ", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_from_json_sorts_segments() {
        let json = r#"{
            "3def": {
                "A": [{
                    "db_accession": "P12345",
                    "segments": [
                        {"db_seq_id_beg": 40, "entity_seq_id_beg": 30, "entity_align_length": 5},
                        {"db_seq_id_beg": 10, "entity_seq_id_beg": 1, "entity_align_length": 20}
                    ]
                }]
            }
        }"#;
        let summary = SiftsSummary::from_json(json).unwrap();
        let result = summary.longest_alignments("3DEF", &chains(&["A"])).unwrap();
        let spans = &result[&("A".to_string(), "P12345".to_string())];
        assert_eq!(spans[0].entity_seq_id_beg, 1);
        assert_eq!(spans[1].entity_seq_id_beg, 30);
    }
}
