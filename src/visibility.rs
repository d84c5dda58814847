//! Visibility classification of listing records

use crate::github::RepositoryRecord;

/// References of every public record, in listing order.
///
/// Duplicates in the listing are kept.
pub fn extract_public(records: &[RepositoryRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|record| !record.is_private)
        .map(|record| record.reference.clone())
        .collect()
}
