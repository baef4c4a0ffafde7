//! Top-N ranking of a tally.
//!
//! Entries are ordered by call count, highest first. Equal counts are
//! ordered by ascending key so the same tally always ranks the same way.

use super::histogram::Tally;
use std::cmp::Ordering;

/// One ranked key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingItem {
    pub key: String,
    pub call_count: u64,
}

impl RankingItem {
    pub fn new(key: impl Into<String>, call_count: u64) -> Self {
        Self {
            key: key.into(),
            call_count,
        }
    }
}

/// Ranked entries plus the grand total of calls they were drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub items: Vec<RankingItem>,
    pub total: u64,
}

impl Ranking {
    /// Calls accounted for by the ranked entries
    pub fn covered(&self) -> u64 {
        self.items.iter().map(|i| i.call_count).sum()
    }

    /// Share of all calls accounted for by the ranked entries
    pub fn coverage_percentage(&self) -> f64 {
        if self.total > 0 {
            (self.covered() as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Rank the `n` most counted keys of `tally`
///
/// **Public** - main entry point for ranking
///
/// Returns `min(n, tally.distinct())` entries.
pub fn rank(tally: &Tally, n: usize) -> Ranking {
    let mut entries: Vec<(&str, u64)> = tally.iter().collect();
    entries.sort_unstable_by(compare_entries);
    entries.truncate(n);

    Ranking {
        items: entries
            .into_iter()
            .map(|(key, count)| RankingItem::new(key, count))
            .collect(),
        total: tally.total(),
    }
}

/// Count descending, then key ascending
///
/// **Private** - total order, so an unstable sort is deterministic
fn compare_entries(a: &(&str, u64), b: &(&str, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
