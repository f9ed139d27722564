use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::catalog::sifts::{AlignmentSource, AlignmentSpan};
use crate::core::entity::{AlignedRegion, AlignmentEntry, ReferenceAccessionEntry};
use crate::matching::processor::{RemapConfig, RemapError};
use crate::matching::resolver::ReferenceEntry;
use crate::utils::validation::structure_id;

/// Entry shapes that can be built from an alignment-source hit
pub trait FallbackEntry: ReferenceEntry + Sized {
    fn from_alignment(
        database_name: &str,
        accession: &str,
        provenance: &str,
        spans: &[AlignmentSpan],
    ) -> Self;
}

impl FallbackEntry for ReferenceAccessionEntry {
    fn from_alignment(
        database_name: &str,
        accession: &str,
        provenance: &str,
        _spans: &[AlignmentSpan],
    ) -> Self {
        Self::new(database_name, accession, provenance)
    }
}

impl FallbackEntry for AlignmentEntry {
    fn from_alignment(
        database_name: &str,
        accession: &str,
        provenance: &str,
        spans: &[AlignmentSpan],
    ) -> Self {
        let regions = spans
            .iter()
            .map(|s| AlignedRegion::new(s.db_seq_id_beg, s.entity_seq_id_beg, s.entity_align_length))
            .collect();
        Self::new(database_name, accession, provenance).with_regions(regions)
    }
}

/// Build replacement entries for an entity from the alignment source.
///
/// One entry is produced per distinct reference accession aligned to any of
/// the entity's chains. When several chains align to the same accession, the
/// chain with the most aligned residues supplies the regions.
///
/// # Errors
///
/// Returns `RemapError::InvalidEntityKey` if no structure id can be taken from
/// the entity key, or `RemapError::AlignmentSource` if the source fails.
pub fn fallback_entries<E: FallbackEntry>(
    source: &dyn AlignmentSource,
    config: &RemapConfig,
    entity_key: &str,
    chain_ids: &[String],
) -> Result<Vec<E>, RemapError> {
    let structure = structure_id(entity_key)
        .ok_or_else(|| RemapError::InvalidEntityKey(entity_key.to_string()))?;
    let alignments = source.longest_alignments(structure, chain_ids)?;

    let mut best: BTreeMap<&str, &[AlignmentSpan]> = BTreeMap::new();
    for ((chain_id, accession), spans) in &alignments {
        let current = best.entry(accession.as_str()).or_insert(spans.as_slice());
        if aligned_length(spans) > aligned_length(*current) {
            debug!(
                entity = %entity_key,
                chain = %chain_id,
                accession = %accession,
                "Using longer alignment from another chain"
            );
            *current = spans.as_slice();
        }
    }

    let entries: Vec<E> = best
        .into_iter()
        .map(|(accession, spans)| {
            E::from_alignment(
                &config.reference_database_name,
                accession,
                &config.fallback_provenance,
                spans,
            )
        })
        .collect();

    if entries.is_empty() {
        info!(entity = %entity_key, "No alternative {} mapping from {}", E::KIND, config.fallback_provenance);
    } else {
        info!(
            entity = %entity_key,
            count = entries.len(),
            "Using {} {} mapping",
            config.fallback_provenance,
            E::KIND
        );
    }

    Ok(entries)
}

fn aligned_length(spans: &[AlignmentSpan]) -> u64 {
    spans.iter().map(|s| u64::from(s.entity_align_length)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sifts::{SiftsAlignment, SiftsSummary};

    fn summary() -> SiftsSummary {
        SiftsSummary::new()
            .with_alignment(
                "1ABC",
                "A",
                SiftsAlignment {
                    db_accession: "P84098".to_string(),
                    segments: vec![AlignmentSpan::new(2, 1, 30)],
                },
            )
            .with_alignment(
                "1ABC",
                "B",
                SiftsAlignment {
                    db_accession: "P84098".to_string(),
                    segments: vec![AlignmentSpan::new(2, 1, 40), AlignmentSpan::new(50, 45, 5)],
                },
            )
            .with_alignment(
                "1ABC",
                "B",
                SiftsAlignment {
                    db_accession: "Q99999".to_string(),
                    segments: vec![AlignmentSpan::new(1, 60, 10)],
                },
            )
    }

    fn chains(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_accession_fallback_one_per_accession() {
        let entries: Vec<ReferenceAccessionEntry> = fallback_entries(
            &summary(),
            &RemapConfig::default(),
            "1ABC_1",
            &chains(&["A", "B"]),
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                ReferenceAccessionEntry::new("UniProt", "P84098", "SIFTS"),
                ReferenceAccessionEntry::new("UniProt", "Q99999", "SIFTS"),
            ]
        );
    }

    #[test]
    fn test_alignment_fallback_uses_longest_chain() {
        let entries: Vec<AlignmentEntry> = fallback_entries(
            &summary(),
            &RemapConfig::default(),
            "1abc_1",
            &chains(&["A", "B"]),
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reference_database_accession, "P84098");
        assert_eq!(entries[0].provenance_code, "SIFTS");
        assert_eq!(
            entries[0].aligned_regions,
            vec![AlignedRegion::new(2, 1, 40), AlignedRegion::new(50, 45, 5)]
        );
    }

    #[test]
    fn test_no_alignments() {
        let entries: Vec<AlignmentEntry> =
            fallback_entries(&summary(), &RemapConfig::default(), "9ZZZ_1", &chains(&["A"]))
                .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_short_entity_key() {
        let result: Result<Vec<AlignmentEntry>, _> =
            fallback_entries(&summary(), &RemapConfig::default(), "1AB", &chains(&["A"]));
        assert!(matches!(result, Err(RemapError::InvalidEntityKey(_))));
    }
}
