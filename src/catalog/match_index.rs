use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::match_record::MatchRecord;
use crate::parsing::compression::open_reader;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read {what}: {source}")]
    ReadError {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {source}")]
    ParseError {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a provider to answer a lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{provider} lookup failed for '{key}': {reason}")]
pub struct LookupError {
    pub provider: &'static str,
    pub key: String,
    pub reason: String,
}

/// Read-only mapping from accession to its match classification
pub trait MatchIndex {
    /// Look up the match record for an accession.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the provider cannot answer; callers treat this
    /// the same as an absent record.
    fn lookup(&self, accession: &str) -> Result<Option<&MatchRecord>, LookupError>;

    /// All records in the index
    fn records(&self) -> Box<dyn Iterator<Item = &MatchRecord> + '_>;
}

/// In-memory match index built once and shared read-only
#[derive(Debug, Clone, Default)]
pub struct MatchIndexSnapshot {
    records: BTreeMap<String, MatchRecord>,
}

impl MatchIndexSnapshot {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a JSON object keyed by accession (optionally gzipped)
    ///
    /// # Errors
    ///
    /// Returns `IndexError::ReadError` if the file cannot be opened or
    /// `IndexError::ParseError` if its content is not a valid index.
    pub fn load_from_file(path: &Path) -> Result<Self, IndexError> {
        let reader = open_reader(path).map_err(|source| IndexError::ReadError {
            what: "match index",
            source,
        })?;
        let records: BTreeMap<String, MatchRecord> =
            serde_json::from_reader(reader).map_err(|source| IndexError::ParseError {
                what: "match index",
                source,
            })?;
        debug!(path = %path.display(), records = records.len(), "Loaded match index");
        Ok(Self { records })
    }

    /// Parse an index from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `IndexError::ParseError` if the JSON is not a valid index.
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let records = serde_json::from_str(json).map_err(|source| IndexError::ParseError {
            what: "match index",
            source,
        })?;
        Ok(Self { records })
    }

    /// Add a record, keyed by its search id
    pub fn insert(&mut self, record: MatchRecord) {
        self.records.insert(record.search_id.clone(), record);
    }

    #[must_use]
    pub fn with_record(mut self, record: MatchRecord) -> Self {
        self.insert(record);
        self
    }

    /// Number of accessions in the index
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MatchIndex for MatchIndexSnapshot {
    fn lookup(&self, accession: &str) -> Result<Option<&MatchRecord>, LookupError> {
        Ok(self.records.get(accession))
    }

    fn records(&self) -> Box<dyn Iterator<Item = &MatchRecord> + '_> {
        Box::new(self.records.values())
    }
}
