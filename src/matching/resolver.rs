use tracing::{debug, info};

use crate::catalog::match_index::MatchIndex;
use crate::core::entity::{AlignmentEntry, ReferenceAccessionEntry};
use crate::core::match_record::MatchRecord;
use crate::core::types::{MatchClass, TaxId, TaxonomyIds};
use crate::matching::processor::RemapConfig;

/// Accessors shared by the entry shapes that carry a reference accession.
///
/// Both shapes go through the same [`Resolver`], so their matching rules
/// cannot drift apart.
pub trait ReferenceEntry {
    /// Short name used in log messages
    const KIND: &'static str;

    fn database_name(&self) -> &str;
    fn accession(&self) -> &str;
    fn provenance(&self) -> &str;
    fn set_accession(&mut self, accession: String);
}

impl ReferenceEntry for ReferenceAccessionEntry {
    const KIND: &'static str = "accession";

    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn accession(&self) -> &str {
        &self.database_accession
    }

    fn provenance(&self) -> &str {
        &self.provenance_source
    }

    fn set_accession(&mut self, accession: String) {
        self.database_accession = accession;
    }
}

impl ReferenceEntry for AlignmentEntry {
    const KIND: &'static str = "alignment";

    fn database_name(&self) -> &str {
        &self.reference_database_name
    }

    fn accession(&self) -> &str {
        &self.reference_database_accession
    }

    fn provenance(&self) -> &str {
        &self.provenance_code
    }

    fn set_accession(&mut self, accession: String) {
        self.reference_database_accession = accession;
    }
}

/// Why an entry could not be resolved against the match index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The accession is not in the match index
    NotInIndex,
    /// The match index has no current accession for it
    Unmatched,
    /// The match index failed to answer
    LookupFailed,
    /// Secondary match without any candidate accession
    NoCandidates,
    /// Several candidates and the entity has no taxonomy information
    NoTaxonomy,
    /// Several candidates and the entity has this many taxonomy ids
    MultipleTaxonomy(usize),
    /// No candidate has the entity's taxonomy id
    NoTaxonomyMatch(TaxId),
    /// More than one candidate has the entity's taxonomy id
    AmbiguousTaxonomyMatch(TaxId),
    /// Assigned by a trusted provenance, but to another database
    OtherDatabase,
    /// Assigned by a provenance that is not trusted for remapping
    UntrustedProvenance,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInIndex => write!(f, "not in match index"),
            Self::Unmatched => write!(f, "no current match"),
            Self::LookupFailed => write!(f, "match index lookup failed"),
            Self::NoCandidates => write!(f, "secondary match without candidates"),
            Self::NoTaxonomy => write!(f, "no taxonomy ids"),
            Self::MultipleTaxonomy(n) => write!(f, "{n} taxonomy ids"),
            Self::NoTaxonomyMatch(tax_id) => write!(f, "no candidate with taxonomy id {tax_id}"),
            Self::AmbiguousTaxonomyMatch(tax_id) => {
                write!(f, "several candidates with taxonomy id {tax_id}")
            }
            Self::OtherDatabase => write!(f, "other reference database"),
            Self::UntrustedProvenance => write!(f, "untrusted provenance"),
        }
    }
}

/// Outcome of resolving one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Already canonical; the entry is unchanged
    Canonical,
    /// The accession was rewritten to its canonical replacement
    Remapped { from: String, to: String },
    /// The entry's database is excluded; the entry must be dropped
    Excluded,
    /// The entry could not be resolved and needs a fallback
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Canonical | Self::Remapped { .. })
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded)
    }

    /// Short lowercase name of the outcome
    pub fn label(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Remapped { .. } => "remapped",
            Self::Excluded => "excluded",
            Self::Unresolved(_) => "unresolved",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remapped { from, to } => write!(f, "remapped {from} -> {to}"),
            Self::Unresolved(reason) => write!(f, "unresolved ({reason})"),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// Applies the match index and taxonomy tie-break to reference entries
pub struct Resolver<'a> {
    index: &'a dyn MatchIndex,
    config: &'a RemapConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a dyn MatchIndex, config: &'a RemapConfig) -> Self {
        Self { index, config }
    }

    /// Resolve one entry in place.
    ///
    /// Rules, in order:
    /// 1. An excluded database drops the entry.
    /// 2. A reference-database entry from a trusted provenance is looked up:
    ///    primary stays, secondary is rewritten when a single candidate can be
    ///    chosen (directly, or by the entity's single taxonomy id).
    /// 3. Anything else is left as is and reported unresolved.
    pub fn resolve<E: ReferenceEntry>(
        &self,
        entity_key: &str,
        entry: &mut E,
        tax_ids: &TaxonomyIds,
    ) -> Resolution {
        let accession = entry.accession().to_string();
        debug!(
            entity = %entity_key,
            accession = %accession,
            database = %entry.database_name(),
            provenance = %entry.provenance(),
            "Resolving {}",
            E::KIND
        );

        let resolution = if self.config.is_excluded(entry.database_name()) {
            Resolution::Excluded
        } else if entry.database_name() == self.config.reference_database_name
            && self.config.is_trusted(entry.provenance())
        {
            self.resolve_reference(entity_key, entry, tax_ids)
        } else if self.config.is_trusted(entry.provenance()) {
            info!(
                entity = %entity_key,
                accession = %accession,
                database = %entry.database_name(),
                "Leaving reference {} assigned by a trusted provenance",
                E::KIND
            );
            Resolution::Unresolved(UnresolvedReason::OtherDatabase)
        } else {
            info!(
                entity = %entity_key,
                accession = %accession,
                database = %entry.database_name(),
                provenance = %entry.provenance(),
                "Leaving reference {}",
                E::KIND
            );
            Resolution::Unresolved(UnresolvedReason::UntrustedProvenance)
        };

        debug!(
            entity = %entity_key,
            accession = %accession,
            matched = resolution.is_matched(),
            excluded = resolution.is_excluded(),
            "Resolved {}",
            E::KIND
        );
        resolution
    }

    fn resolve_reference<E: ReferenceEntry>(
        &self,
        entity_key: &str,
        entry: &mut E,
        tax_ids: &TaxonomyIds,
    ) -> Resolution {
        let record = match self.index.lookup(entry.accession()) {
            Ok(Some(record)) => record,
            Ok(None) => return Resolution::Unresolved(UnresolvedReason::NotInIndex),
            Err(e) => {
                debug!(entity = %entity_key, error = %e, "Treating failed lookup as unresolved");
                return Resolution::Unresolved(UnresolvedReason::LookupFailed);
            }
        };

        match record.matched {
            MatchClass::Primary => Resolution::Canonical,
            MatchClass::Secondary => match choose_candidate(record, tax_ids) {
                Ok(candidate) => {
                    let from = entry.accession().to_string();
                    let to = candidate.to_string();
                    info!(
                        entity = %entity_key,
                        from = %from,
                        to = %to,
                        "Remapped secondary {}",
                        E::KIND
                    );
                    entry.set_accession(to.clone());
                    Resolution::Remapped { from, to }
                }
                Err(reason) => {
                    match &reason {
                        UnresolvedReason::NoTaxonomy => info!(
                            entity = %entity_key,
                            accession = %record.search_id,
                            "No taxonomy ids to choose among secondary matches"
                        ),
                        UnresolvedReason::MultipleTaxonomy(_) => info!(
                            entity = %entity_key,
                            accession = %record.search_id,
                            tax_ids = ?tax_ids,
                            "Ambiguous secondary match"
                        ),
                        _ => debug!(
                            entity = %entity_key,
                            accession = %record.search_id,
                            reason = %reason,
                            "Unresolved secondary match"
                        ),
                    }
                    Resolution::Unresolved(reason)
                }
            },
            MatchClass::Unmatched | MatchClass::Unknown => {
                Resolution::Unresolved(UnresolvedReason::Unmatched)
            }
        }
    }
}

/// Pick the single canonical replacement of a secondary accession
fn choose_candidate<'r>(
    record: &'r MatchRecord,
    tax_ids: &TaxonomyIds,
) -> Result<&'r str, UnresolvedReason> {
    let mut candidates = record.matched_ids.keys().map(String::as_str);
    match (candidates.next(), candidates.next()) {
        (None, _) => return Err(UnresolvedReason::NoCandidates),
        (Some(only), None) => return Ok(only),
        _ => {}
    }

    let tax_id = match tax_ids.len() {
        0 => return Err(UnresolvedReason::NoTaxonomy),
        1 => *tax_ids.iter().next().ok_or(UnresolvedReason::NoTaxonomy)?,
        n => return Err(UnresolvedReason::MultipleTaxonomy(n)),
    };

    let mut matching = record.candidates_for_taxon(tax_id);
    match (matching.next(), matching.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(UnresolvedReason::NoTaxonomyMatch(tax_id)),
        (Some(_), Some(_)) => Err(UnresolvedReason::AmbiguousTaxonomyMatch(tax_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::match_index::{LookupError, MatchIndexSnapshot};
    use crate::core::entity::AlignedRegion;

    fn test_index() -> MatchIndexSnapshot {
        MatchIndexSnapshot::new()
            .with_record(MatchRecord::primary("P69905"))
            .with_record(MatchRecord::secondary("P01942", [("P01942-2", 10090)]))
            .with_record(MatchRecord::secondary(
                "P14118",
                [("P84099", 10090), ("P84100", 10116), ("P84098", 9606)],
            ))
            .with_record(MatchRecord::secondary("Q11111", [("Q22222", 9606), ("Q33333", 9606)]))
            .with_record(MatchRecord::secondary("Q44444", Vec::<(String, u32)>::new()))
            .with_record(MatchRecord::unmatched("Q00000"))
    }

    fn taxa(ids: &[u32]) -> TaxonomyIds {
        ids.iter().copied().map(TaxId).collect()
    }

    fn uniprot(accession: &str) -> ReferenceAccessionEntry {
        ReferenceAccessionEntry::new("UniProt", accession, "PDB")
    }

    fn resolve(entry: &mut ReferenceAccessionEntry, tax_ids: &[u32]) -> Resolution {
        let index = test_index();
        let config = RemapConfig::default();
        Resolver::new(&index, &config).resolve("1ABC_1", entry, &taxa(tax_ids))
    }

    #[test]
    fn test_excluded_database() {
        let mut entry = ReferenceAccessionEntry::new("PDB", "1ABC", "PDB");
        assert_eq!(resolve(&mut entry, &[9606]), Resolution::Excluded);
    }

    #[test]
    fn test_primary_is_unchanged() {
        let mut entry = uniprot("P69905");
        let before = entry.clone();
        let resolution = resolve(&mut entry, &[]);
        assert_eq!(resolution, Resolution::Canonical);
        assert!(resolution.is_matched());
        assert_eq!(entry, before);
    }

    #[test]
    fn test_secondary_single_candidate() {
        let mut entry = uniprot("P01942");
        let resolution = resolve(&mut entry, &[9606, 10090]);
        assert_eq!(
            resolution,
            Resolution::Remapped {
                from: "P01942".to_string(),
                to: "P01942-2".to_string()
            }
        );
        assert_eq!(entry.database_accession, "P01942-2");
    }

    #[test]
    fn test_secondary_by_taxonomy() {
        let mut entry = uniprot("P14118");
        assert!(resolve(&mut entry, &[9606]).is_matched());
        assert_eq!(entry.database_accession, "P84098");
    }

    #[test]
    fn test_secondary_multiple_taxonomy_ids() {
        let mut entry = uniprot("P14118");
        let resolution = resolve(&mut entry, &[9606, 10090]);
        assert_eq!(
            resolution,
            Resolution::Unresolved(UnresolvedReason::MultipleTaxonomy(2))
        );
        assert_eq!(entry.database_accession, "P14118");
    }

    #[test]
    fn test_secondary_without_taxonomy() {
        let mut entry = uniprot("P14118");
        assert_eq!(
            resolve(&mut entry, &[]),
            Resolution::Unresolved(UnresolvedReason::NoTaxonomy)
        );
    }

    #[test]
    fn test_secondary_no_taxonomy_match() {
        let mut entry = uniprot("P14118");
        assert_eq!(
            resolve(&mut entry, &[7227]),
            Resolution::Unresolved(UnresolvedReason::NoTaxonomyMatch(TaxId(7227)))
        );
        assert_eq!(entry.database_accession, "P14118");
    }

    #[test]
    fn test_secondary_ambiguous_taxonomy_match() {
        let mut entry = uniprot("Q11111");
        assert_eq!(
            resolve(&mut entry, &[9606]),
            Resolution::Unresolved(UnresolvedReason::AmbiguousTaxonomyMatch(TaxId(9606)))
        );
    }

    #[test]
    fn test_secondary_without_candidates() {
        let mut entry = uniprot("Q44444");
        assert_eq!(
            resolve(&mut entry, &[9606]),
            Resolution::Unresolved(UnresolvedReason::NoCandidates)
        );
    }

    #[test]
    fn test_unmatched_and_missing() {
        let mut entry = uniprot("Q00000");
        assert_eq!(
            resolve(&mut entry, &[9606]),
            Resolution::Unresolved(UnresolvedReason::Unmatched)
        );

        let mut entry = uniprot("P99999");
        assert_eq!(
            resolve(&mut entry, &[9606]),
            Resolution::Unresolved(UnresolvedReason::NotInIndex)
        );
    }

    #[test]
    fn test_other_database_and_provenance() {
        let mut entry = ReferenceAccessionEntry::new("GenBank", "AAA12345", "PDB");
        assert_eq!(
            resolve(&mut entry, &[9606]),
            Resolution::Unresolved(UnresolvedReason::OtherDatabase)
        );

        let mut entry = ReferenceAccessionEntry::new("UniProt", "P14118", "SIFTS");
        let resolution = resolve(&mut entry, &[9606]);
        assert_eq!(
            resolution,
            Resolution::Unresolved(UnresolvedReason::UntrustedProvenance)
        );
        assert!(!resolution.is_excluded());
        assert_eq!(entry.database_accession, "P14118");
    }

    #[test]
    fn test_alignment_keeps_regions() {
        let index = test_index();
        let config = RemapConfig::default();
        let regions = vec![AlignedRegion::new(2, 1, 40), AlignedRegion::new(50, 41, 12)];
        let mut entry =
            AlignmentEntry::new("UniProt", "P14118", "PDB").with_regions(regions.clone());

        let resolution = Resolver::new(&index, &config).resolve("1ABC_1", &mut entry, &taxa(&[9606]));
        assert!(resolution.is_matched());
        assert_eq!(entry.reference_database_accession, "P84098");
        assert_eq!(entry.aligned_regions, regions);
    }

    struct FailingIndex;

    impl MatchIndex for FailingIndex {
        fn lookup(&self, accession: &str) -> Result<Option<&MatchRecord>, LookupError> {
            Err(LookupError {
                provider: "test",
                key: accession.to_string(),
                reason: "unavailable".to_string(),
            })
        }

        fn records(&self) -> Box<dyn Iterator<Item = &MatchRecord> + '_> {
            Box::new(std::iter::empty())
        }
    }

    #[test]
    fn test_lookup_failure_is_unresolved() {
        let config = RemapConfig::default();
        let mut entry = uniprot("P14118");
        let resolution = Resolver::new(&FailingIndex, &config).resolve("1ABC_1", &mut entry, &taxa(&[9606]));
        assert_eq!(
            resolution,
            Resolution::Unresolved(UnresolvedReason::LookupFailed)
        );
    }
}
