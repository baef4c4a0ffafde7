#![allow(dead_code)]

use fbt_trace_analysis::reader::{CallRecord, CallSpec, MemoryTrace, RecordIter, TraceBuilder, TraceReader};
use fbt_trace_analysis::store::{CallHandle, Client, Module};
use fbt_trace_analysis::utils::error::TraceError;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

pub fn module(name: &str) -> Module {
    Module {
        name: name.to_string(),
        path: format!("C:\\Windows\\System32\\{}.dll", name),
        load_address: 0x7c00_0000,
        size: 0x10_0000,
    }
}

/// One client (pid 4, tid 8) with three top-level calls:
/// - ntdll!RtlAllocateHeap with two ntdll!RtlpAllocateHeap children
/// - kernel32!CreateFileW, synthetic, with children that must never be fetched
/// - ntdll!RtlFreeHeap
///
/// Returns the trace and the handle of the synthetic call.
pub fn heap_trace() -> (MemoryTrace, CallHandle) {
    let mut builder = TraceBuilder::new();
    builder.add_module(module("ntdll"));
    builder.add_module(module("kernel32"));

    let client = builder.add_client(Client::new(4, 8));

    let alloc = builder.add_call(client, None, CallSpec::new("ntdll", "RtlAllocateHeap"));
    builder.add_call(client, Some(alloc), CallSpec::new("ntdll", "RtlpAllocateHeap"));
    builder.add_call(client, Some(alloc), CallSpec::new("ntdll", "RtlpAllocateHeap"));

    let create = builder.add_call(
        client,
        None,
        CallSpec::new("kernel32", "CreateFileW").synthetic(),
    );
    builder.add_call(client, Some(create), CallSpec::new("ntdll", "NtCreateFile"));
    builder.add_call(client, Some(create), CallSpec::new("ntdll", "NtCreateFile"));

    builder.add_call(client, None, CallSpec::new("ntdll", "RtlFreeHeap"));

    (builder.build(), create)
}

/// Shared view of what a `ScriptedReader` was asked to do
#[derive(Debug, Default)]
pub struct ReaderLog {
    pub call_requests: Cell<u32>,
    pub synthetic_expansions: Cell<u32>,
    pub closed: Cell<u32>,
    pub expanded: RefCell<Vec<CallHandle>>,
}

/// Wraps a `MemoryTrace`, counts requests and injects failures
pub struct ScriptedReader {
    inner: MemoryTrace,
    synthetic: HashSet<CallHandle>,
    fail_on_request: Option<u32>,
    fail_clients_after: Option<usize>,
    log: Rc<ReaderLog>,
}

impl ScriptedReader {
    pub fn new(inner: MemoryTrace) -> Self {
        Self {
            inner,
            synthetic: HashSet::new(),
            fail_on_request: None,
            fail_clients_after: None,
            log: Rc::new(ReaderLog::default()),
        }
    }

    /// Refuse (and record) any attempt to expand these calls
    pub fn guard_synthetic(mut self, handle: CallHandle) -> Self {
        self.synthetic.insert(handle);
        self
    }

    /// Fail the n-th call enumeration request (1-based, top-level and child requests together)
    pub fn fail_on_request(mut self, n: u32) -> Self {
        self.fail_on_request = Some(n);
        self
    }

    /// Yield the first n clients, then a read error
    pub fn fail_clients_after(mut self, n: usize) -> Self {
        self.fail_clients_after = Some(n);
        self
    }

    pub fn log(&self) -> Rc<ReaderLog> {
        Rc::clone(&self.log)
    }

    fn next_request(&self) -> Result<(), TraceError> {
        let n = self.log.call_requests.get() + 1;
        self.log.call_requests.set(n);
        if self.fail_on_request == Some(n) {
            return Err(TraceError::read(format!("injected failure on request {}", n)));
        }
        Ok(())
    }
}

impl TraceReader for ScriptedReader {
    fn clients(&self) -> Result<RecordIter<'_, Client>, TraceError> {
        let clients = self.inner.clients()?;
        match self.fail_clients_after {
            None => Ok(clients),
            Some(n) => Ok(Box::new(clients.take(n).chain(std::iter::once(Err(
                TraceError::read("client enumeration failed"),
            ))))),
        }
    }

    fn calls(&self, client: &Client) -> Result<RecordIter<'_, CallRecord>, TraceError> {
        self.next_request()?;
        self.inner.calls(client)
    }

    fn child_calls(&self, handle: CallHandle) -> Result<RecordIter<'_, CallRecord>, TraceError> {
        if self.synthetic.contains(&handle) {
            self.log
                .synthetic_expansions
                .set(self.log.synthetic_expansions.get() + 1);
            return Err(TraceError::read("children of a synthetic call requested"));
        }
        self.next_request()?;
        self.log.expanded.borrow_mut().push(handle);
        self.inner.child_calls(handle)
    }

    fn modules(&self) -> Result<RecordIter<'_, Module>, TraceError> {
        self.inner.modules()
    }

    fn close(&mut self) -> Result<(), TraceError> {
        self.log.closed.set(self.log.closed.get() + 1);
        Ok(())
    }
}
