use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::match_index::MatchIndex;
use crate::core::types::MatchClass;

/// Counts of match classifications over a whole match index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub primary: usize,
    pub secondary: usize,
    pub unmatched: usize,
}

impl AssignmentSummary {
    /// Total number of records tallied
    pub fn total(&self) -> usize {
        self.primary + self.secondary + self.unmatched
    }

    /// Fraction of records that are already canonical
    pub fn primary_fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.primary as f64 / total as f64
        }
    }
}

/// Tally how the accessions in a match index line up with the current
/// reference database.
pub fn summarize(index: &dyn MatchIndex) -> AssignmentSummary {
    let mut summary = AssignmentSummary::default();
    for record in index.records() {
        match record.matched {
            MatchClass::Primary => summary.primary += 1,
            MatchClass::Secondary => summary.secondary += 1,
            MatchClass::Unmatched | MatchClass::Unknown => summary.unmatched += 1,
        }
    }
    debug!(
        primary = summary.primary,
        secondary = summary.secondary,
        unmatched = summary.unmatched,
        "Reference accession match summary"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::match_index::MatchIndexSnapshot;
    use crate::core::match_record::MatchRecord;

    #[test]
    fn test_summarize() {
        let index = MatchIndexSnapshot::new()
            .with_record(MatchRecord::primary("P69905"))
            .with_record(MatchRecord::primary("P68871"))
            .with_record(MatchRecord::secondary("P14118", [("P84098", 9606)]))
            .with_record(MatchRecord::unmatched("Q00000"));

        let summary = summarize(&index);
        assert_eq!(
            summary,
            AssignmentSummary {
                primary: 2,
                secondary: 1,
                unmatched: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert!((summary.primary_fraction() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&MatchIndexSnapshot::new());
        assert_eq!(summary.total(), 0);
        assert!(summary.primary_fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_class_counts_as_unmatched() {
        let index = MatchIndexSnapshot::from_json(
            r#"{"X1": {"searchId": "X1", "matched": "obsolete"}}"#,
        )
        .unwrap();
        assert_eq!(summarize(&index).unmatched, 1);
    }
}
