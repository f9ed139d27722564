//! Centralized validation and helper functions.

/// Number of leading characters of an entity key that name its structure
pub const STRUCTURE_ID_LENGTH: usize = 4;

/// Maximum number of records read from one input (DOS protection)
pub const MAX_RECORDS: usize = 10_000_000;

/// Extract the structure id from an entity key.
///
/// Returns `None` if the key is shorter than a structure id.
///
/// # Examples
///
/// ```
/// use refseq_assign::utils::validation::structure_id;
///
/// assert_eq!(structure_id("1ABC_1"), Some("1ABC"));
/// assert_eq!(structure_id("1AB"), None);
/// ```
#[must_use]
pub fn structure_id(entity_key: &str) -> Option<&str> {
    entity_key.get(..STRUCTURE_ID_LENGTH)
}

/// Check if a string looks like a `UniProt` accession, optionally with an
/// isoform suffix (e.g. `P84098`, `A0A023GPI8`, `P01942-2`).
///
/// Used only for diagnostics; accessions that fail the check are still
/// processed.
#[must_use]
pub fn is_valid_uniprot_accession(s: &str) -> bool {
    let (base, isoform) = match s.split_once('-') {
        Some((base, isoform)) => (base, Some(isoform)),
        None => (s, None),
    };

    if let Some(isoform) = isoform {
        if isoform.is_empty() || !isoform.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    (base.len() == 6 || base.len() == 10)
        && base.starts_with(|c: char| c.is_ascii_uppercase())
        && base.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && base.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
}

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}
