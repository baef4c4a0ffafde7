//! Per-key call counting over a call forest.
//!
//! A [`Tally`] maps a classification key (for example `ntdll!RtlFreeHeap`)
//! to the number of calls that produced it, and keeps the grand total of
//! calls counted. Keys are compared exactly, case included.

use super::walker::CallTreeWalker;
use crate::store::{Call, Client, TraceStore};
use crate::utils::error::TraceError;
use std::collections::HashMap;

/// Key → call count, plus the grand total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, u64>,
    total: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one call for `key`
    pub fn accumulate(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Calls counted for `key`, zero if never seen
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Every call counted, synthetic ones included
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct keys
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Add the counts of an independently built tally
    pub fn merge(&mut self, other: Tally) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
        self.total += other.total;
    }

    /// Iterate over `(key, count)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &c)| (k.as_str(), c))
    }
}

/// Fold a stream of calls into `tally`
///
/// **Public** - shared by the store-wide and per-client entry points
///
/// Stops at the first error and returns it. Everything counted before the
/// error stays in `tally`.
pub fn fold_calls<I, F>(calls: I, mut key_fn: F, tally: &mut Tally) -> Result<(), TraceError>
where
    I: IntoIterator<Item = Result<Call, TraceError>>,
    F: FnMut(&Call) -> String,
{
    for call in calls {
        let call = call?;
        tally.accumulate(key_fn(&call));
    }
    Ok(())
}

/// Count every call of every client in the store
///
/// **Public** - main entry point for histogram building
///
/// # Arguments
/// * `store` - Open trace store
/// * `key_fn` - Classification key of a call
/// * `tally` - Accumulator, possibly already holding counts
///
/// # Errors
/// * `TraceError::Read` - enumeration failed; `tally` keeps the partial counts
pub fn build_histogram<F>(store: &TraceStore, key_fn: F, tally: &mut Tally) -> Result<(), TraceError>
where
    F: FnMut(&Call) -> String,
{
    let walker = CallTreeWalker::for_store(store)?;
    fold_calls(walker, key_fn, tally)
}

/// Count the calls of a single client
pub fn build_client_histogram<F>(
    store: &TraceStore,
    client: &Client,
    key_fn: F,
    tally: &mut Tally,
) -> Result<(), TraceError>
where
    F: FnMut(&Call) -> String,
{
    let walker = CallTreeWalker::for_client(store, client)?;
    fold_calls(walker, key_fn, tally)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut tally = Tally::new();
        tally.accumulate("ntdll!NtClose");
        tally.accumulate("ntdll!NtClose");
        tally.accumulate("ntdll!ntclose");

        assert_eq!(tally.count("ntdll!NtClose"), 2);
        assert_eq!(tally.count("ntdll!ntclose"), 1);
        assert_eq!(tally.count("missing"), 0);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.distinct(), 2);
    }

    #[test]
    fn test_merge() {
        let mut a = Tally::new();
        a.accumulate("x");
        a.accumulate("y");

        let mut b = Tally::new();
        b.accumulate("y");
        b.accumulate("z");

        a.merge(b);
        assert_eq!(a.count("x"), 1);
        assert_eq!(a.count("y"), 2);
        assert_eq!(a.count("z"), 1);
        assert_eq!(a.total(), 4);
        assert_eq!(a.iter().map(|(_, c)| c).sum::<u64>(), a.total());
    }

    #[test]
    fn test_fold_keeps_partial_counts() {
        let calls: Vec<Result<Call, TraceError>> = vec![Err(TraceError::read("boom"))];
        let mut tally = Tally::new();
        tally.accumulate("seen");

        let result = fold_calls(calls, |c| c.qualified_name(), &mut tally);
        assert!(result.is_err());
        assert_eq!(tally.total(), 1);
    }
}
