//! Aggregation of call trees into rankings.
//!
//! This module turns the calls of a trace store into:
//! - A pre-order walk over every call (`walker`)
//! - Per-key call counts (`histogram`)
//! - Top-N rankings (`ranking`)
//! - Name prefix grouping keys (`prefix`)

pub mod histogram;
pub mod prefix;
pub mod ranking;
pub mod walker;

use crate::store::Call;

// Re-export main types and functions
pub use histogram::{build_client_histogram, build_histogram, fold_calls, Tally};
pub use prefix::function_name_prefix;
pub use ranking::{rank, Ranking, RankingItem};
pub use walker::CallTreeWalker;

/// Which key calls are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Most called routines, keyed `Module!Function`
    Top,
    /// Most called name prefixes, keyed by the function name prefix alone
    Prefix,
}

impl AnalysisKind {
    /// Grouping key of `call` for this analysis
    pub fn key(self, call: &Call) -> String {
        match self {
            AnalysisKind::Top => call.qualified_name(),
            AnalysisKind::Prefix => function_name_prefix(&call.function_name).to_string(),
        }
    }
}
