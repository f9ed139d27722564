use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::catalog::match_index::{LookupError, MatchIndex};
use crate::catalog::sifts::AlignmentSource;
use crate::core::entity::EntityRecord;
use crate::core::types::{ReferenceField, RemapMode, TaxonomyIds};
use crate::matching::fallback::{fallback_entries, FallbackEntry};
use crate::matching::resolver::{Resolution, Resolver};

/// Default canonical reference sequence database
pub const DEFAULT_REFERENCE_DATABASE: &str = "UniProt";

/// Default provenance whose assignments are trusted for remapping
pub const DEFAULT_PROVENANCE: &str = "PDB";

/// Default database whose entries are always dropped
pub const DEFAULT_EXCLUDED_DATABASE: &str = "PDB";

/// Provenance tag of entries built from the alignment source
pub const DEFAULT_FALLBACK_PROVENANCE: &str = "SIFTS";

#[derive(Error, Debug)]
pub enum RemapError {
    #[error("Entity key '{0}' is too short to contain a structure id")]
    InvalidEntityKey(String),

    #[error("Alignment source failed: {0}")]
    AlignmentSource(#[from] LookupError),
}

/// Configuration for the entity record processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapConfig {
    /// Database whose accessions are checked against the match index
    pub reference_database_name: String,
    /// Provenances whose assignments are eligible for remapping
    pub provenance_allow_list: Vec<String>,
    /// Databases whose entries are dropped outright
    pub exclusion_list: Vec<String>,
    /// Provenance written on entries built from the alignment source
    pub fallback_provenance: String,
    /// Whether results are written back to the caller's record
    pub mode: RemapMode,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            reference_database_name: DEFAULT_REFERENCE_DATABASE.to_string(),
            provenance_allow_list: vec![DEFAULT_PROVENANCE.to_string()],
            exclusion_list: vec![DEFAULT_EXCLUDED_DATABASE.to_string()],
            fallback_provenance: DEFAULT_FALLBACK_PROVENANCE.to_string(),
            mode: RemapMode::Apply,
        }
    }
}

impl RemapConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: RemapMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_reference_database(mut self, name: impl Into<String>) -> Self {
        self.reference_database_name = name.into();
        self
    }

    #[must_use]
    pub fn with_provenance_allow_list(mut self, provenances: Vec<String>) -> Self {
        self.provenance_allow_list = provenances;
        self
    }

    #[must_use]
    pub fn with_exclusion_list(mut self, databases: Vec<String>) -> Self {
        self.exclusion_list = databases;
        self
    }

    pub fn is_excluded(&self, database_name: &str) -> bool {
        self.exclusion_list.iter().any(|d| d == database_name)
    }

    pub fn is_trusted(&self, provenance: &str) -> bool {
        self.provenance_allow_list.iter().any(|p| p == provenance)
    }
}

/// Tally of resolutions for one reference field of one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    pub canonical: usize,
    pub remapped: usize,
    pub excluded: usize,
    pub unresolved: usize,
    /// Entries appended from the alignment source
    pub fallback: usize,
    /// Nothing survived and the field was removed from the record
    pub removed: bool,
}

impl FieldStats {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Canonical => self.canonical += 1,
            Resolution::Remapped { .. } => self.remapped += 1,
            Resolution::Excluded => self.excluded += 1,
            Resolution::Unresolved(_) => self.unresolved += 1,
        }
    }

    /// Accumulate another tally into this one
    pub fn merge(&mut self, other: &FieldStats) {
        self.canonical += other.canonical;
        self.remapped += other.remapped;
        self.excluded += other.excluded;
        self.unresolved += other.unresolved;
        self.fallback += other.fallback;
        self.removed |= other.removed;
    }
}

/// Per-field tallies for one record; `None` means the field was skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    pub accessions: Option<FieldStats>,
    pub alignments: Option<FieldStats>,
}

/// Result of filtering one entity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    /// False only when an applied remapping failed part way
    pub ok: bool,
    /// Whether the caller's record was mutated
    pub applied: bool,
    pub stats: RecordStats,
    /// Failure message of the remapping pass, also kept for dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reconciles the reference sequence assignments of entity records
pub struct EntityRecordProcessor<'a> {
    index: &'a dyn MatchIndex,
    source: &'a dyn AlignmentSource,
    config: RemapConfig,
}

impl<'a> EntityRecordProcessor<'a> {
    /// Create a processor with default configuration
    pub fn new(index: &'a dyn MatchIndex, source: &'a dyn AlignmentSource) -> Self {
        Self {
            index,
            source,
            config: RemapConfig::default(),
        }
    }

    /// Create a processor with custom configuration
    pub fn with_config(
        index: &'a dyn MatchIndex,
        source: &'a dyn AlignmentSource,
        config: RemapConfig,
    ) -> Self {
        Self {
            index,
            source,
            config,
        }
    }

    pub fn config(&self) -> &RemapConfig {
        &self.config
    }

    /// Reconcile the accession and alignment lists of one record.
    ///
    /// Never fails: errors are logged and reported through
    /// [`FilterOutcome::ok`]. In [`RemapMode::DryRun`] the work is done on a
    /// copy, the record is left untouched and the outcome is always `ok`.
    pub fn filter(&self, record: &mut EntityRecord) -> FilterOutcome {
        match self.config.mode {
            RemapMode::Apply => {
                let mut stats = RecordStats::default();
                let error = self.remap(record, &mut stats).err().map(|e| e.to_string());
                FilterOutcome {
                    ok: error.is_none(),
                    applied: true,
                    stats,
                    error,
                }
            }
            RemapMode::DryRun => {
                let mut trial = record.clone();
                let mut stats = RecordStats::default();
                let error = self.remap(&mut trial, &mut stats).err().map(|e| e.to_string());
                FilterOutcome {
                    ok: true,
                    applied: false,
                    stats,
                    error,
                }
            }
        }
    }

    fn remap(&self, record: &mut EntityRecord, stats: &mut RecordStats) -> Result<(), RemapError> {
        let entity_key = record.entity_key.clone();
        info!(entity = %entity_key, "Remapping reference sequence assignments");

        let result = self.remap_fields(&entity_key, record, stats);
        if let Err(e) = &result {
            error!(entity = %entity_key, error = %e, "Reference sequence remapping failed");
        }
        result
    }

    fn remap_fields(
        &self,
        entity_key: &str,
        record: &mut EntityRecord,
        stats: &mut RecordStats,
    ) -> Result<(), RemapError> {
        let tax_ids = record.taxonomy_ids();
        let chain_ids = record.chain_ids().to_vec();

        if let Some(entries) = record.accessions().cloned() {
            let (kept, field_stats) = self.remap_field(
                entity_key,
                ReferenceField::Accessions,
                entries,
                &chain_ids,
                &tax_ids,
            )?;
            record.set_accessions(kept);
            stats.accessions = Some(field_stats);
        }

        match record.alignments.clone() {
            Some(entries) if !chain_ids.is_empty() => {
                let (kept, field_stats) = self.remap_field(
                    entity_key,
                    ReferenceField::Alignments,
                    entries,
                    &chain_ids,
                    &tax_ids,
                )?;
                record.set_alignments(kept);
                stats.alignments = Some(field_stats);
            }
            Some(_) => debug!(entity = %entity_key, "No chain ids, leaving alignments as is"),
            None => {}
        }

        Ok(())
    }

    /// Resolve every entry of one field and build its replacement list
    fn remap_field<E: FallbackEntry>(
        &self,
        entity_key: &str,
        field: ReferenceField,
        entries: Vec<E>,
        chain_ids: &[String],
        tax_ids: &TaxonomyIds,
    ) -> Result<(Vec<E>, FieldStats), RemapError> {
        let resolver = Resolver::new(self.index, &self.config);
        let mut stats = FieldStats::default();
        let mut kept = Vec::with_capacity(entries.len());
        let mut fallback_done = false;

        for mut entry in entries {
            let resolution = resolver.resolve(entity_key, &mut entry, tax_ids);
            stats.record(&resolution);

            if resolution.is_matched() {
                kept.push(entry);
            } else if resolution.is_excluded() || fallback_done {
                continue;
            } else {
                // The alignment source answers per entity, not per entry
                fallback_done = true;
                let replacements: Vec<E> =
                    fallback_entries(self.source, &self.config, entity_key, chain_ids)?;
                stats.fallback += replacements.len();
                kept.extend(replacements);
            }
        }

        if kept.is_empty() {
            stats.removed = true;
            info!(entity = %entity_key, field = %field, "Incomplete reference sequence mapping");
        }

        Ok((kept, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::match_index::MatchIndexSnapshot;
    use crate::catalog::sifts::{AlignmentSpan, LongestAlignments, SiftsAlignment, SiftsSummary};
    use crate::core::entity::{AlignedRegion, AlignmentEntry, ReferenceAccessionEntry};
    use crate::core::match_record::MatchRecord;

    fn index() -> MatchIndexSnapshot {
        MatchIndexSnapshot::new()
            .with_record(MatchRecord::primary("P69905"))
            .with_record(MatchRecord::secondary(
                "P14118",
                [("P84099", 10090), ("P84100", 10116), ("P84098", 9606)],
            ))
    }

    fn sifts() -> SiftsSummary {
        SiftsSummary::new().with_alignment(
            "1ABC",
            "A",
            SiftsAlignment {
                db_accession: "P84098".to_string(),
                segments: vec![AlignmentSpan::new(2, 1, 114)],
            },
        )
    }

    fn record(tax_ids: &[u32]) -> EntityRecord {
        EntityRecord::new("1ABC_1")
            .with_chains(["A"])
            .with_tax_ids(tax_ids.iter().copied())
            .with_accessions(vec![
                ReferenceAccessionEntry::new("UniProt", "P14118", "PDB"),
                ReferenceAccessionEntry::new("PDB", "1ABC", "PDB"),
            ])
            .with_alignments(vec![AlignmentEntry::new("UniProt", "P14118", "PDB")
                .with_regions(vec![AlignedRegion::new(1, 1, 114)])])
    }

    #[test]
    fn test_filter_remaps_by_taxonomy() {
        let (index, sifts) = (index(), sifts());
        let processor = EntityRecordProcessor::new(&index, &sifts);
        let mut rec = record(&[9606]);

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);
        assert!(outcome.applied);

        let accessions = rec.accessions().unwrap();
        assert_eq!(accessions.len(), 1);
        assert_eq!(accessions[0].database_accession, "P84098");

        let alignments = rec.alignments.as_ref().unwrap();
        assert_eq!(alignments[0].reference_database_accession, "P84098");
        assert_eq!(alignments[0].aligned_regions, vec![AlignedRegion::new(1, 1, 114)]);

        let stats = outcome.stats.accessions.unwrap();
        assert_eq!(stats.remapped, 1);
        assert_eq!(stats.excluded, 1);
    }

    #[test]
    fn test_filter_falls_back_to_sifts() {
        let (index, sifts) = (index(), sifts());
        let processor = EntityRecordProcessor::new(&index, &sifts);
        let mut rec = record(&[9606, 10090]);

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);

        let accessions = rec.accessions().unwrap();
        assert_eq!(
            accessions,
            &vec![ReferenceAccessionEntry::new("UniProt", "P84098", "SIFTS")]
        );

        let alignments = rec.alignments.as_ref().unwrap();
        assert_eq!(alignments[0].provenance_code, "SIFTS");
        assert_eq!(alignments[0].aligned_regions, vec![AlignedRegion::new(2, 1, 114)]);
        assert_eq!(outcome.stats.alignments.unwrap().fallback, 1);
    }

    #[test]
    fn test_filter_removes_empty_fields() {
        let index = index();
        let sifts = SiftsSummary::new();
        let processor = EntityRecordProcessor::new(&index, &sifts);
        let mut rec = record(&[9606, 10090]);

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);
        assert!(rec.accessions().is_none());
        assert!(rec.alignments.is_none());
        assert!(outcome.stats.accessions.unwrap().removed);
        assert!(outcome.stats.alignments.unwrap().removed);
    }

    #[test]
    fn test_fallback_appended_once_per_field() {
        let index = MatchIndexSnapshot::new();
        let sifts = sifts();
        let processor = EntityRecordProcessor::new(&index, &sifts);
        let mut rec = EntityRecord::new("1ABC_2").with_chains(["A"]).with_accessions(vec![
            ReferenceAccessionEntry::new("UniProt", "Q00001", "PDB"),
            ReferenceAccessionEntry::new("UniProt", "Q00002", "PDB"),
        ]);

        let outcome = processor.filter(&mut rec);
        assert_eq!(rec.accessions().unwrap().len(), 1);
        let stats = outcome.stats.accessions.unwrap();
        assert_eq!(stats.unresolved, 2);
        assert_eq!(stats.fallback, 1);
    }

    #[test]
    fn test_alignments_skipped_without_chains() {
        let (index, sifts) = (index(), sifts());
        let processor = EntityRecordProcessor::new(&index, &sifts);
        let alignments = vec![AlignmentEntry::new("UniProt", "Q00001", "PDB")];
        let mut rec = EntityRecord::new("1ABC_1").with_alignments(alignments.clone());

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);
        assert_eq!(rec.alignments, Some(alignments));
        assert!(outcome.stats.alignments.is_none());
        assert!(outcome.stats.accessions.is_none());
    }

    #[test]
    fn test_dry_run_leaves_record_untouched() {
        let (index, sifts) = (index(), sifts());
        let config = RemapConfig::default().with_mode(RemapMode::DryRun);
        let processor = EntityRecordProcessor::with_config(&index, &sifts, config);
        let mut rec = record(&[9606]);
        let before = rec.clone();

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);
        assert!(!outcome.applied);
        assert_eq!(rec, before);
        assert_eq!(outcome.stats.accessions.unwrap().remapped, 1);
    }

    struct BrokenSource;

    impl AlignmentSource for BrokenSource {
        fn longest_alignments(
            &self,
            structure_id: &str,
            _chain_ids: &[String],
        ) -> Result<LongestAlignments, LookupError> {
            Err(LookupError {
                provider: "SIFTS",
                key: structure_id.to_string(),
                reason: "summary unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_source_failure_is_reported_not_raised() {
        let index = index();
        let processor = EntityRecordProcessor::new(&index, &BrokenSource);
        let mut rec = record(&[9606, 10090]);
        let before = rec.clone();

        let outcome = processor.filter(&mut rec);
        assert!(!outcome.ok);
        assert!(outcome.error.unwrap().contains("summary unavailable"));
        assert_eq!(rec.accessions(), before.accessions());
    }

    #[test]
    fn test_dry_run_reports_ok_on_failure() {
        let index = index();
        let config = RemapConfig::default().with_mode(RemapMode::DryRun);
        let processor = EntityRecordProcessor::with_config(&index, &BrokenSource, config);
        let mut rec = record(&[9606, 10090]);

        let outcome = processor.filter(&mut rec);
        assert!(outcome.ok);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_config_lists() {
        let config = RemapConfig::default()
            .with_provenance_allow_list(vec!["PDB".to_string(), "SIFTS".to_string()])
            .with_exclusion_list(Vec::new());
        assert!(config.is_trusted("SIFTS"));
        assert!(!config.is_excluded("PDB"));
        assert_eq!(config.reference_database_name, "UniProt");
    }
}
