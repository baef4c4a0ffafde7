//! JSON trace file schema.
//!
//! A trace file is one JSON document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "modules": [
//!     { "name": "ntdll", "path": "C:\\Windows\\System32\\ntdll.dll",
//!       "load_address": 2088763392, "size": 1572864 }
//!   ],
//!   "clients": [
//!     { "process_id": 4, "thread_id": 8,
//!       "calls": [
//!         { "id": 1, "function": "RtlAllocateHeap", "module": "ntdll" },
//!         { "id": 2, "parent": 1, "function": "RtlpAllocateHeap", "module": "ntdll" }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Calls are stored flat, in recording order. A call without `parent` is a
//! top-level call of its client; otherwise `parent` names an earlier call of
//! the same client. Keeping the tree flat keeps the document shallow no
//! matter how deep the recorded call tree is.

use crate::store::{EntryType, ExitType};
use serde::Deserialize;

/// Top-level trace document
#[derive(Debug, Clone, Deserialize)]
pub struct TraceDocument {
    /// Format version, `major.minor`
    pub version: String,

    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    #[serde(default)]
    pub clients: Vec<ClientEntry>,
}

/// A module loaded by some traced process
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleEntry {
    pub name: String,

    #[serde(default, alias = "file_path")]
    pub path: String,

    #[serde(default)]
    pub load_address: u64,

    #[serde(default)]
    pub size: u32,
}

/// One traced process/thread and its calls
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEntry {
    #[serde(alias = "pid")]
    pub process_id: u32,

    #[serde(alias = "tid")]
    pub thread_id: u32,

    #[serde(default)]
    pub calls: Vec<CallEntry>,
}

/// One recorded call
#[derive(Debug, Clone, Deserialize)]
pub struct CallEntry {
    /// Identifier, unique within the client
    pub id: u64,

    /// Identifier of the calling call, absent for top-level calls
    #[serde(default)]
    pub parent: Option<u64>,

    /// Resolved symbol name
    #[serde(alias = "name")]
    pub function: String,

    /// Name of the module the routine lives in
    pub module: String,

    #[serde(default)]
    pub entry: EntryType,

    #[serde(default)]
    pub exit: ExitType,

    #[serde(default)]
    pub entry_timestamp: u64,

    #[serde(default)]
    pub exit_timestamp: u64,

    #[serde(default)]
    pub caller_ip: u64,

    #[serde(default)]
    pub return_value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_applied() {
        let doc: TraceDocument = serde_json::from_value(json!({
            "version": "1.0",
            "clients": [
                { "pid": 4, "tid": 8, "calls": [
                    { "id": 1, "name": "KiFastCallEntry", "module": "nt" }
                ] }
            ]
        }))
        .unwrap();

        assert!(doc.modules.is_empty());
        let call = &doc.clients[0].calls[0];
        assert_eq!(call.function, "KiFastCallEntry");
        assert_eq!(call.parent, None);
        assert_eq!(call.entry, EntryType::Normal);
        assert_eq!(call.exit, ExitType::Normal);
    }

    #[test]
    fn test_entry_and_exit_types() {
        let call: CallEntry = serde_json::from_value(json!({
            "id": 3, "parent": 1, "function": "f", "module": "m",
            "entry": "synthetic", "exit": "exception"
        }))
        .unwrap();

        assert_eq!(call.parent, Some(1));
        assert_eq!(call.entry, EntryType::Synthetic);
        assert_eq!(call.exit, ExitType::Exception);
    }

    #[test]
    fn test_unknown_entry_type_rejected() {
        let result: Result<CallEntry, _> = serde_json::from_value(json!({
            "id": 3, "function": "f", "module": "m", "entry": "weird"
        }));
        assert!(result.is_err());
    }
}
