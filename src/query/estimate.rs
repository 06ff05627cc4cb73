//! Cell count estimation

use crate::query::QueryDocument;

/// Number of cells a query document would return
///
/// The product of the value counts of every entry. Merged variables have no
/// entry and therefore contribute a factor of one, so a document with no
/// entries estimates to 1. Saturates instead of overflowing.
pub fn estimate(doc: &QueryDocument) -> u64 {
    doc.entries()
        .iter()
        .map(|entry| entry.values().len() as u64)
        .fold(1u64, |acc, count| acc.saturating_mul(count))
}
