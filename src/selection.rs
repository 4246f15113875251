//! Threshold selection over enriched entries.

use crate::types::FundEntry;

/// Predicate on the return rate, in percent points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// return < value
    Below(f64),
    /// return > value
    Above(f64),
}

impl Threshold {
    /// Entries without a return never match
    pub fn matches(&self, entry: &FundEntry) -> bool {
        match (self, entry.return_rate) {
            (Threshold::Below(limit), Some(r)) => r < *limit,
            (Threshold::Above(limit), Some(r)) => r > *limit,
            (_, None) => false,
        }
    }
}

/// Entries with a temperature that satisfy `predicate`, coldest first.
/// Equal temperatures keep their input order.
pub fn select<P>(entries: &[FundEntry], predicate: P) -> Vec<FundEntry>
where
    P: Fn(&FundEntry) -> bool,
{
    let mut selected: Vec<FundEntry> = entries
        .iter()
        .filter(|e| e.temperature.is_some())
        .filter(|e| predicate(*e))
        .cloned()
        .collect();

    // sort_by is stable
    selected.sort_by(|a, b| {
        let ta = a.temperature.unwrap_or_default();
        let tb = b.temperature.unwrap_or_default();
        ta.total_cmp(&tb)
    });

    selected
}

/// Entries satisfying `predicate`, in source order
pub fn select_in_order<P>(entries: &[FundEntry], predicate: P) -> Vec<FundEntry>
where
    P: Fn(&FundEntry) -> bool,
{
    entries.iter().filter(|e| predicate(*e)).cloned().collect()
}
