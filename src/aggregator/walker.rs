//! Depth-first walk over a call forest.
//!
//! The walker yields every call exactly once, parents before their children,
//! in the order the store enumerates them. It keeps an explicit stack of
//! child iterators instead of recursing, so tree depth is bounded by memory
//! only.
//!
//! Children of a synthetic call are never requested. A failed enumeration is
//! yielded as a single `Err`, after which the walker is exhausted.

use crate::store::{Call, Calls, Client, Clients, TraceStore};
use crate::utils::error::TraceError;

/// Pre-order iterator over the calls of one client or a whole store
pub struct CallTreeWalker<'s> {
    store: &'s TraceStore,
    clients: Option<Clients<'s>>,
    stack: Vec<Calls<'s>>,
    // Child fetch failure, reported right after the call it belongs to
    deferred: Option<TraceError>,
    visited: u64,
    done: bool,
}

impl<'s> CallTreeWalker<'s> {
    /// Walk the call forest of a single client
    pub fn for_client(store: &'s TraceStore, client: &Client) -> Result<Self, TraceError> {
        let calls = store.calls(client)?;
        Ok(Self {
            store,
            clients: None,
            stack: vec![calls],
            deferred: None,
            visited: 0,
            done: false,
        })
    }

    /// Walk every client of the store, one after the other
    pub fn for_store(store: &'s TraceStore) -> Result<Self, TraceError> {
        let clients = store.clients()?;
        Ok(Self {
            store,
            clients: Some(clients),
            stack: Vec::new(),
            deferred: None,
            visited: 0,
            done: false,
        })
    }

    /// Number of calls yielded so far, synthetic ones included
    pub fn visited(&self) -> u64 {
        self.visited
    }

    /// Number of call sequences currently open on the work stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn fail(&mut self, error: TraceError) -> Option<Result<Call, TraceError>> {
        self.done = true;
        self.stack.clear();
        self.clients = None;
        Some(Err(error))
    }

    fn finish(&mut self) -> Option<Result<Call, TraceError>> {
        self.done = true;
        self.clients = None;
        None
    }
}

impl Iterator for CallTreeWalker<'_> {
    type Item = Result<Call, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(error) = self.deferred.take() {
            return self.fail(error);
        }

        loop {
            let item = match self.stack.last_mut() {
                Some(top) => top.next(),
                None => {
                    // Current client exhausted; move to the next one
                    let next_client = match self.clients.as_mut() {
                        Some(clients) => clients.next(),
                        None => None,
                    };
                    match next_client {
                        None => return self.finish(),
                        Some(Err(e)) => return self.fail(e),
                        Some(Ok(client)) => match self.store.calls(&client) {
                            Ok(calls) => self.stack.push(calls),
                            Err(e) => return self.fail(e),
                        },
                    }
                    continue;
                }
            };

            match item {
                None => {
                    self.stack.pop();
                }
                Some(Err(e)) => return self.fail(e),
                Some(Ok(call)) => {
                    if !call.is_synthetic() {
                        match self.store.children(&call) {
                            Ok(children) => self.stack.push(children),
                            Err(e) => self.deferred = Some(e),
                        }
                    }
                    self.visited += 1;
                    return Some(Ok(call));
                }
            }
        }
    }
}
