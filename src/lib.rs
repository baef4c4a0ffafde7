//! Fbt Trace Analysis
//!
//! Reads function boundary traces and ranks the routines they record.
//!
//! A trace holds, per traced process/thread ("client"), a forest of call
//! trees. This crate opens a trace as a [`store::TraceStore`], walks those
//! trees without recursing, and counts calls per key to answer questions
//! like "which routines were called most?" or "which name prefixes
//! dominate?".
//!
//! ## Getting Started
//!
//! Most users should use the CLI:
//!
//! ```bash
//! trcan top trace.json
//! trcan prefix trace.json --count 20
//! ```
//!
//! Library use:
//!
//! ```ignore
//! use fbt_trace_analysis::aggregator::{build_histogram, rank, AnalysisKind, Tally};
//! use fbt_trace_analysis::store::TraceStore;
//!
//! let store = TraceStore::open("trace.json")?;
//! let mut tally = Tally::new();
//! build_histogram(&store, |call| AnalysisKind::Top.key(call), &mut tally)?;
//! let ranking = rank(&tally, 100);
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod reader;
pub mod store;
pub mod utils;
