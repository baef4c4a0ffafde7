//! Trace store handle and call tree model.
//!
//! A [`TraceStore`] owns one decoder for its whole lifetime. Clients, calls
//! and modules are enumerated from it on demand; nothing is cached, so every
//! enumeration walks the decoder again.
//!
//! Using a store after [`TraceStore::close`], or handing it a [`Call`] that
//! another store produced, is a programming error and panics.

pub mod model;

use crate::reader::{open_json_trace, CallRecord, RecordIter, TraceReader};
use crate::utils::error::TraceError;
use log::{debug, warn};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

// Re-export main types
pub use model::{Call, CallHandle, Client, EntryType, ExitType, Module};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Lazy sequence of clients
pub type Clients<'s> = RecordIter<'s, Client>;

/// Lazy sequence of modules
pub type Modules<'s> = RecordIter<'s, Module>;

/// An open trace
pub struct TraceStore {
    id: u64,
    reader: Option<Box<dyn TraceReader>>,
}

impl TraceStore {
    /// Open a JSON trace file
    ///
    /// **Public** - main entry point
    ///
    /// # Errors
    /// * `TraceError::NotFound` - path does not exist
    /// * `TraceError::Open` - the decoder rejected the file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let trace = open_json_trace(path)?;
        Ok(Self::from_reader(trace))
    }

    /// Wrap an already opened decoder
    pub fn from_reader(reader: impl TraceReader + 'static) -> Self {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        debug!("Trace store {} opened", id);
        Self {
            id,
            reader: Some(Box::new(reader)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Release the decoder. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), TraceError> {
        if let Some(mut reader) = self.reader.take() {
            debug!("Closing trace store {}", self.id);
            reader.close()?;
        }
        Ok(())
    }

    /// Every client present in the trace
    pub fn clients(&self) -> Result<Clients<'_>, TraceError> {
        self.reader().clients()
    }

    /// Top-level calls of `client`
    pub fn calls(&self, client: &Client) -> Result<Calls<'_>, TraceError> {
        let records = self.reader().calls(client)?;
        Ok(Calls::new(records, self.id))
    }

    /// Child calls of `call`
    ///
    /// Synthetic calls never have children; the decoder is not asked.
    ///
    /// # Panics
    /// If the store is closed or `call` came from another store.
    pub fn children(&self, call: &Call) -> Result<Calls<'_>, TraceError> {
        let reader = self.reader();
        assert_eq!(
            call.store_id, self.id,
            "call {} was produced by trace store {}, not {}",
            call, call.store_id, self.id
        );

        if call.is_synthetic() {
            return Ok(Calls::empty(self.id));
        }

        let records = reader.child_calls(call.handle)?;
        Ok(Calls::new(records, self.id))
    }

    /// Every module that shows up in the trace
    pub fn modules(&self) -> Result<Modules<'_>, TraceError> {
        self.reader().modules()
    }

    fn reader(&self) -> &dyn TraceReader {
        match self.reader.as_deref() {
            Some(reader) => reader,
            None => panic!("trace store {} used after close", self.id),
        }
    }
}

impl Drop for TraceStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close trace store {}: {}", self.id, e);
        }
    }
}

impl std::fmt::Debug for TraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceStore")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Lazy sequence of calls borrowed from a store
pub struct Calls<'s> {
    records: Option<RecordIter<'s, CallRecord>>,
    store_id: u64,
}

impl<'s> Calls<'s> {
    fn new(records: RecordIter<'s, CallRecord>, store_id: u64) -> Self {
        Self {
            records: Some(records),
            store_id,
        }
    }

    fn empty(store_id: u64) -> Self {
        Self {
            records: None,
            store_id,
        }
    }
}

impl Iterator for Calls<'_> {
    type Item = Result<Call, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.as_mut()?.next()?;
        Some(record.map(|r| Call::from_record(r, self.store_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CallSpec, MemoryTrace, TraceBuilder};

    fn sample_trace() -> MemoryTrace {
        let mut builder = TraceBuilder::new();
        builder.add_module(Module {
            name: "kernel32".to_string(),
            path: "C:\\Windows\\System32\\kernel32.dll".to_string(),
            load_address: 0x7c80_0000,
            size: 0xf6000,
        });
        let client = builder.add_client(Client::new(4, 8));
        let root = builder.add_call(client, None, CallSpec::new("kernel32", "CreateFileW"));
        builder.add_call(client, Some(root), CallSpec::new("kernel32", "BaseSetLastNtError"));
        builder.add_call(client, None, CallSpec::new("kernel32", "CloseHandle").synthetic());
        builder.build()
    }

    #[test]
    fn test_enumerate_and_expand() {
        let store = TraceStore::from_reader(sample_trace());
        let clients: Vec<Client> = store.clients().unwrap().map(|c| c.unwrap()).collect();
        assert_eq!(clients, vec![Client::new(4, 8)]);

        let calls: Vec<Call> = store.calls(&clients[0]).unwrap().map(|c| c.unwrap()).collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].module_path, "C:\\Windows\\System32\\kernel32.dll");

        let children: Vec<Call> = store.children(&calls[0]).unwrap().map(|c| c.unwrap()).collect();
        assert_eq!(children[0].qualified_name(), "kernel32!BaseSetLastNtError");

        assert!(calls[1].is_synthetic());
        assert_eq!(store.children(&calls[1]).unwrap().count(), 0);
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let store = TraceStore::from_reader(sample_trace());
        let client = Client::new(4, 8);
        let first: Vec<Call> = store.calls(&client).unwrap().map(|c| c.unwrap()).collect();
        let second: Vec<Call> = store.calls(&client).unwrap().map(|c| c.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut store = TraceStore::from_reader(sample_trace());
        assert!(store.is_open());
        store.close().unwrap();
        store.close().unwrap();
        assert!(!store.is_open());
    }

    #[test]
    #[should_panic(expected = "used after close")]
    fn test_enumerate_after_close_panics() {
        let mut store = TraceStore::from_reader(sample_trace());
        store.close().unwrap();
        let _ = store.clients();
    }

    #[test]
    #[should_panic(expected = "was produced by trace store")]
    fn test_foreign_call_panics() {
        let a = TraceStore::from_reader(sample_trace());
        let b = TraceStore::from_reader(sample_trace());
        let call = a.calls(&Client::new(4, 8)).unwrap().next().unwrap().unwrap();
        let _ = b.children(&call);
    }

    #[test]
    fn test_store_ids_are_unique() {
        let a = TraceStore::from_reader(sample_trace());
        let b = TraceStore::from_reader(sample_trace());
        assert_ne!(a.id(), b.id());
    }
}
