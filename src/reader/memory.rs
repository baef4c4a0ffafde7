//! Arena-backed in-memory decoder.
//!
//! Calls live in one flat arena; a `CallHandle` is the arena index. Module
//! paths are resolved by module name each time a call record is produced,
//! so a call naming an unknown module surfaces as a read error at the point
//! it is enumerated.

use super::{CallRecord, RecordIter, TraceReader};
use crate::store::{CallHandle, Client, EntryType, ExitType, Module};
use crate::utils::error::TraceError;
use std::collections::HashMap;

/// Description of one call to add to a [`TraceBuilder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub function_name: String,
    pub module_name: String,
    pub entry_type: EntryType,
    pub exit_type: ExitType,
    pub entry_timestamp: u64,
    pub exit_timestamp: u64,
    pub caller_ip: u64,
    pub return_value: u64,
}

impl CallSpec {
    /// A normal call of `module!function`
    pub fn new(module_name: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            module_name: module_name.into(),
            entry_type: EntryType::Normal,
            exit_type: ExitType::Normal,
            entry_timestamp: 0,
            exit_timestamp: 0,
            caller_ip: 0,
            return_value: 0,
        }
    }

    /// Mark the entry as synthetic
    pub fn synthetic(mut self) -> Self {
        self.entry_type = EntryType::Synthetic;
        self
    }

    pub fn with_exit(mut self, exit_type: ExitType) -> Self {
        self.exit_type = exit_type;
        self
    }

    pub fn with_timestamps(mut self, entry: u64, exit: u64) -> Self {
        self.entry_timestamp = entry;
        self.exit_timestamp = exit;
        self
    }

    pub fn with_caller_ip(mut self, caller_ip: u64) -> Self {
        self.caller_ip = caller_ip;
        self
    }

    pub fn with_return_value(mut self, return_value: u64) -> Self {
        self.return_value = return_value;
        self
    }
}

#[derive(Debug)]
struct Node {
    spec: CallSpec,
    client: usize,
    children: Vec<usize>,
}

/// Builds a [`MemoryTrace`] client by client, call by call
///
/// Calls are enumerated later in the order they were added.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    modules: Vec<Module>,
    clients: Vec<(Client, Vec<usize>)>,
    nodes: Vec<Node>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; a later module with the same name replaces the path lookup
    pub fn add_module(&mut self, module: Module) -> &mut Self {
        self.modules.push(module);
        self
    }

    /// Register a client and return its index, reusing an existing entry
    pub fn add_client(&mut self, client: Client) -> usize {
        if let Some(index) = self.clients.iter().position(|(c, _)| *c == client) {
            return index;
        }
        self.clients.push((client, Vec::new()));
        self.clients.len() - 1
    }

    /// Add a call to `client`, nested under `parent` when given
    ///
    /// # Panics
    /// If `client` was not returned by `add_client`, or `parent` is not a
    /// call of the same client added earlier.
    pub fn add_call(
        &mut self,
        client: usize,
        parent: Option<CallHandle>,
        spec: CallSpec,
    ) -> CallHandle {
        assert!(client < self.clients.len(), "unknown client index {}", client);

        let index = self.nodes.len();
        match parent {
            Some(CallHandle(p)) => {
                let parent = self
                    .nodes
                    .get_mut(p as usize)
                    .unwrap_or_else(|| panic!("unknown parent call handle {}", p));
                assert_eq!(parent.client, client, "parent call belongs to another client");
                parent.children.push(index);
            }
            None => self.clients[client].1.push(index),
        }

        self.nodes.push(Node {
            spec,
            client,
            children: Vec::new(),
        });

        CallHandle(index as u64)
    }

    pub fn build(self) -> MemoryTrace {
        let module_index = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();

        MemoryTrace {
            modules: self.modules,
            module_index,
            clients: self.clients,
            nodes: self.nodes,
        }
    }
}

/// Fully loaded trace, served from memory
#[derive(Debug)]
pub struct MemoryTrace {
    modules: Vec<Module>,
    module_index: HashMap<String, usize>,
    clients: Vec<(Client, Vec<usize>)>,
    nodes: Vec<Node>,
}

impl MemoryTrace {
    /// Total number of calls held, across all clients
    pub fn call_count(&self) -> usize {
        self.nodes.len()
    }

    fn record(&self, index: usize) -> Result<CallRecord, TraceError> {
        let node = &self.nodes[index];
        let module = self
            .module_index
            .get(&node.spec.module_name)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| {
                TraceError::read(format!(
                    "call {} ({}) references unknown module '{}'",
                    index, node.spec.function_name, node.spec.module_name
                ))
            })?;

        Ok(CallRecord {
            function_name: node.spec.function_name.clone(),
            module_name: module.name.clone(),
            module_path: module.path.clone(),
            entry_type: node.spec.entry_type,
            exit_type: node.spec.exit_type,
            entry_timestamp: node.spec.entry_timestamp,
            exit_timestamp: node.spec.exit_timestamp,
            caller_ip: node.spec.caller_ip,
            return_value: node.spec.return_value,
            handle: CallHandle(index as u64),
        })
    }

    fn records<'a>(&'a self, indices: &'a [usize]) -> RecordIter<'a, CallRecord> {
        Box::new(indices.iter().map(move |&i| self.record(i)))
    }
}

impl TraceReader for MemoryTrace {
    fn clients(&self) -> Result<RecordIter<'_, Client>, TraceError> {
        Ok(Box::new(self.clients.iter().map(|(c, _)| Ok(*c))))
    }

    fn calls(&self, client: &Client) -> Result<RecordIter<'_, CallRecord>, TraceError> {
        let (_, roots) = self
            .clients
            .iter()
            .find(|(c, _)| c == client)
            .ok_or_else(|| TraceError::read(format!("unknown client {}", client)))?;

        Ok(self.records(roots))
    }

    fn child_calls(&self, handle: CallHandle) -> Result<RecordIter<'_, CallRecord>, TraceError> {
        let node = self
            .nodes
            .get(handle.0 as usize)
            .ok_or_else(|| TraceError::read(format!("invalid call handle {}", handle.0)))?;

        Ok(self.records(&node.children))
    }

    fn modules(&self) -> Result<RecordIter<'_, Module>, TraceError> {
        Ok(Box::new(self.modules.iter().cloned().map(Ok)))
    }
}
