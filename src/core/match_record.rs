use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{MatchClass, TaxId};

/// Result of matching one accession against the reference database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// The accession that was searched
    pub search_id: String,

    #[serde(default)]
    pub matched: MatchClass,

    /// Candidate canonical accessions (only populated for secondary matches)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub matched_ids: BTreeMap<String, MatchedId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxId>,
}

impl MatchRecord {
    pub fn primary(search_id: impl Into<String>) -> Self {
        Self {
            search_id: search_id.into(),
            matched: MatchClass::Primary,
            matched_ids: BTreeMap::new(),
        }
    }

    pub fn unmatched(search_id: impl Into<String>) -> Self {
        Self {
            search_id: search_id.into(),
            matched: MatchClass::Unmatched,
            matched_ids: BTreeMap::new(),
        }
    }

    /// Secondary match with (candidate accession, taxonomy id) pairs
    pub fn secondary<S: Into<String>>(
        search_id: impl Into<String>,
        candidates: impl IntoIterator<Item = (S, u32)>,
    ) -> Self {
        Self {
            search_id: search_id.into(),
            matched: MatchClass::Secondary,
            matched_ids: candidates
                .into_iter()
                .map(|(id, tax)| {
                    (
                        id.into(),
                        MatchedId {
                            tax_id: Some(TaxId(tax)),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Candidate accessions whose taxonomy id equals `tax_id`
    pub fn candidates_for_taxon(&self, tax_id: TaxId) -> impl Iterator<Item = &str> {
        self.matched_ids
            .iter()
            .filter(move |(_, m)| m.tax_id == Some(tax_id))
            .map(|(id, _)| id.as_str())
    }
}
