//! JSON trace file decoder.
//!
//! Loads a [`TraceDocument`] and turns it into a [`MemoryTrace`].
//! Structural problems (bad JSON, unsupported version, dangling parent ids)
//! reject the whole file. Per-record problems such as a call naming an
//! unknown module are left for enumeration time.

use super::memory::{CallSpec, MemoryTrace, TraceBuilder};
use super::schema::{ClientEntry, TraceDocument};
use crate::store::{CallHandle, Client, Module};
use crate::utils::config::TRACE_FORMAT_MAJOR;
use crate::utils::error::TraceError;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open and decode a JSON trace file
///
/// **Public** - main entry point for file-backed stores
///
/// # Errors
/// * `TraceError::NotFound` - `path` does not exist
/// * `TraceError::Open` - file unreadable, not valid JSON, wrong version,
///   or inconsistent call structure
pub fn open_json_trace(path: impl AsRef<Path>) -> Result<MemoryTrace, TraceError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TraceError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| TraceError::open(path, e))?;
    let document: TraceDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| TraceError::open(path, e))?;

    build_trace(document).map_err(|reason| TraceError::open(path, reason))
}

/// Decode a JSON trace held in memory
///
/// Errors are reported against the pseudo path `<inline>`.
pub fn parse_json_trace(text: &str) -> Result<MemoryTrace, TraceError> {
    let document: TraceDocument =
        serde_json::from_str(text).map_err(|e| TraceError::open("<inline>", e))?;

    build_trace(document).map_err(|reason| TraceError::open("<inline>", reason))
}

/// Convert a parsed document into an in-memory trace
///
/// **Private** - internal helper for open/parse
fn build_trace(document: TraceDocument) -> Result<MemoryTrace, String> {
    check_version(&document.version)?;

    let mut builder = TraceBuilder::new();

    for module in document.modules {
        builder.add_module(Module {
            name: module.name,
            path: module.path,
            load_address: module.load_address,
            size: module.size,
        });
    }

    for entry in document.clients {
        add_client(&mut builder, entry)?;
    }

    Ok(builder.build())
}

/// Add one client and its flat call list
///
/// **Private** - parents must precede their children
fn add_client(builder: &mut TraceBuilder, entry: ClientEntry) -> Result<(), String> {
    let client = Client::new(entry.process_id, entry.thread_id);
    let index = builder.add_client(client);

    let mut handles: HashMap<u64, CallHandle> = HashMap::with_capacity(entry.calls.len());

    for call in entry.calls {
        let parent = match call.parent {
            Some(parent_id) => Some(*handles.get(&parent_id).ok_or_else(|| {
                format!(
                    "client {}: call {} refers to unknown or later parent {}",
                    client, call.id, parent_id
                )
            })?),
            None => None,
        };

        let spec = CallSpec {
            function_name: call.function,
            module_name: call.module,
            entry_type: call.entry,
            exit_type: call.exit,
            entry_timestamp: call.entry_timestamp,
            exit_timestamp: call.exit_timestamp,
            caller_ip: call.caller_ip,
            return_value: call.return_value,
        };

        let handle = builder.add_call(index, parent, spec);
        if handles.insert(call.id, handle).is_some() {
            return Err(format!("client {}: duplicate call id {}", client, call.id));
        }
    }

    Ok(())
}

/// Accept any `1.x` version
///
/// **Private** - internal validation
fn check_version(version: &str) -> Result<(), String> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.trim().parse::<u32>().ok())
        .ok_or_else(|| format!("invalid trace format version '{}'", version))?;

    if major != TRACE_FORMAT_MAJOR {
        return Err(format!(
            "unsupported trace format version {} (expected {}.x)",
            version, TRACE_FORMAT_MAJOR
        ));
    }

    Ok(())
}
