//! Trace decoders.
//!
//! The store only talks to a decoder through [`TraceReader`], a pull-based
//! contract: every enumeration request hands back an iterator that yields
//! records (or the error that stopped it) one at a time.
//!
//! This module provides:
//! - `MemoryTrace` - arena-backed decoder built with `TraceBuilder`
//! - `open_json_trace` - loads a JSON trace file into a `MemoryTrace`
//! - `schema` - serde types describing the JSON trace file

pub mod json;
pub mod memory;
pub mod schema;

use crate::store::{CallHandle, Client, EntryType, ExitType, Module};
use crate::utils::error::TraceError;

// Re-export main types
pub use json::{open_json_trace, parse_json_trace};
pub use memory::{CallSpec, MemoryTrace, TraceBuilder};
pub use schema::{CallEntry, ClientEntry, ModuleEntry, TraceDocument};

/// Boxed iterator over decoded items
pub type RecordIter<'a, T> = Box<dyn Iterator<Item = Result<T, TraceError>> + 'a>;

/// A decoded call, before the store stamps its identity on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub function_name: String,
    pub module_name: String,
    pub module_path: String,
    pub entry_type: EntryType,
    pub exit_type: ExitType,
    pub entry_timestamp: u64,
    pub exit_timestamp: u64,
    pub caller_ip: u64,
    pub return_value: u64,
    pub handle: CallHandle,
}

/// Source of clients, calls and modules for a [`TraceStore`](crate::store::TraceStore)
///
/// Implementations are assumed single-threaded; the store never shares one
/// across threads.
pub trait TraceReader {
    /// Every client present in the trace
    fn clients(&self) -> Result<RecordIter<'_, Client>, TraceError>;

    /// Top-level calls recorded for `client`
    fn calls(&self, client: &Client) -> Result<RecordIter<'_, CallRecord>, TraceError>;

    /// Calls made by the call identified by `handle`
    fn child_calls(&self, handle: CallHandle) -> Result<RecordIter<'_, CallRecord>, TraceError>;

    /// Every module that shows up in the trace
    fn modules(&self) -> Result<RecordIter<'_, Module>, TraceError>;

    /// Release the underlying resource. Called exactly once by the store.
    fn close(&mut self) -> Result<(), TraceError> {
        Ok(())
    }
}
