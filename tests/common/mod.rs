//! Shared test helpers
#![allow(dead_code)]

use esbuilder::{BulkRequest, QueryDocument, RawResponse, SearchClient, TransportError};
use serde_json::{json, Value};
use std::cell::RefCell;
use tracing_subscriber::EnvFilter;

/// Route builder logs to the test output; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One recorded client call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(QueryDocument),
    Get(QueryDocument),
    Index(QueryDocument),
    Update(QueryDocument),
    Delete(QueryDocument),
    Bulk(BulkRequest),
}

/// Search client that records every call and answers with a canned response
pub struct RecordingClient {
    response: Value,
    pub calls: RefCell<Vec<Call>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::responding(json!({"acknowledged": true}))
    }

    pub fn responding(response: Value) -> Self {
        Self {
            response,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.borrow().last().cloned()
    }

    fn record(&self, call: Call) -> Result<RawResponse, TransportError> {
        self.calls.borrow_mut().push(call);
        Ok(self.response.clone())
    }
}

impl SearchClient for RecordingClient {
    fn search(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        self.record(Call::Search(document.clone()))
    }

    fn get(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        self.record(Call::Get(document.clone()))
    }

    fn index(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        self.record(Call::Index(document.clone()))
    }

    fn update(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        self.record(Call::Update(document.clone()))
    }

    fn delete(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        self.record(Call::Delete(document.clone()))
    }

    fn bulk(&self, operations: &BulkRequest) -> Result<RawResponse, TransportError> {
        self.record(Call::Bulk(operations.clone()))
    }
}

/// Client whose every call fails at the transport level
pub struct UnreachableClient;

impl UnreachableClient {
    fn fail() -> Result<RawResponse, TransportError> {
        Err(TransportError::Status {
            status: 503,
            reason: "unavailable".to_string(),
        })
    }
}

impl SearchClient for UnreachableClient {
    fn search(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> {
        Self::fail()
    }

    fn get(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> {
        Self::fail()
    }

    fn index(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> {
        Self::fail()
    }

    fn update(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> {
        Self::fail()
    }

    fn delete(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> {
        Self::fail()
    }

    fn bulk(&self, _: &BulkRequest) -> Result<RawResponse, TransportError> {
        Self::fail()
    }
}
