//! Call tree entities handed out by a [`TraceStore`](super::TraceStore).
//!
//! Every value here is an owned snapshot. A `Call` only remembers which
//! store produced it and the handle needed to ask that store for children.

use crate::reader::CallRecord;
use crate::utils::config::{MAX_FUNCTION_NAME_LEN, MODULE_SEPARATOR};
use serde::Deserialize;
use std::fmt;

/// One traced execution context (process/thread pair)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Client {
    pub process_id: u32,
    pub thread_id: u32,
}

impl Client {
    pub fn new(process_id: u32, thread_id: u32) -> Self {
        Self {
            process_id,
            thread_id,
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {} / tid {}", self.process_id, self.thread_id)
    }
}

/// How a call was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Real instrumented entry
    #[default]
    Normal,
    /// Bookkeeping record; never has children
    Synthetic,
}

/// How a call was left
///
/// Not used by the current analyses but kept on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitType {
    #[default]
    Normal,
    Synthetic,
    Exception,
}

/// Opaque identity of a call inside its decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallHandle(pub u64);

/// A loaded module as recorded in the trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub path: String,
    pub load_address: u64,
    pub size: u32,
}

/// One recorded routine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub function_name: String,
    pub module_name: String,
    pub module_path: String,
    pub entry_type: EntryType,
    pub exit_type: ExitType,
    pub entry_timestamp: u64,
    pub exit_timestamp: u64,
    pub caller_ip: u64,
    pub return_value: u64,
    pub(crate) handle: CallHandle,
    pub(crate) store_id: u64,
}

impl Call {
    /// Build a call snapshot from a decoder record
    ///
    /// **Crate** - only the store creates calls, stamping its own id
    pub(crate) fn from_record(record: CallRecord, store_id: u64) -> Self {
        Self {
            function_name: bound_name(record.function_name),
            module_name: record.module_name,
            module_path: record.module_path,
            entry_type: record.entry_type,
            exit_type: record.exit_type,
            entry_timestamp: record.entry_timestamp,
            exit_timestamp: record.exit_timestamp,
            caller_ip: record.caller_ip,
            return_value: record.return_value,
            handle: record.handle,
            store_id,
        }
    }

    /// Synthetic calls are always leaves
    pub fn is_synthetic(&self) -> bool {
        self.entry_type == EntryType::Synthetic
    }

    /// `Module!Function`
    pub fn qualified_name(&self) -> String {
        self.to_string()
    }

    /// Time between entry and exit, zero if the timestamps are inverted
    pub fn duration(&self) -> u64 {
        self.exit_timestamp.saturating_sub(self.entry_timestamp)
    }

    pub fn handle(&self) -> CallHandle {
        self.handle
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.module_name, MODULE_SEPARATOR, self.function_name
        )
    }
}

/// Cut a symbol name to the bounded length, respecting char boundaries
fn bound_name(mut name: String) -> String {
    if let Some((idx, _)) = name.char_indices().nth(MAX_FUNCTION_NAME_LEN) {
        name.truncate(idx);
    }
    name
}
