//! Search client collaborator
//!
//! The builder never talks to the network itself. Every terminal operation
//! compiles a [`QueryDocument`] and hands it to a [`SearchClient`]
//! implementation, which owns connections, retries and authentication.

use crate::document::QueryDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw response body returned by the search engine
pub type RawResponse = Value;

/// Errors reported by a search client
///
/// The builder does not interpret these; they reach the caller unchanged.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The engine answered with a non-success status
    #[error("Search engine returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The engine could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Generic client errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A batch of index operations submitted as one request
///
/// `body` alternates action metadata and document source, in the order the
/// bulk endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub body: Vec<Value>,
}

impl BulkRequest {
    /// Number of documents in the batch
    pub fn len(&self) -> usize {
        self.body.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Trait for search engine clients
///
/// Calls are synchronous and blocking. Timeout and retry policy belong to
/// the implementation.
pub trait SearchClient {
    /// Run a search request
    fn search(&self, document: &QueryDocument) -> Result<RawResponse, TransportError>;

    /// Fetch a single document by id
    fn get(&self, document: &QueryDocument) -> Result<RawResponse, TransportError>;

    /// Index a single document
    fn index(&self, document: &QueryDocument) -> Result<RawResponse, TransportError>;

    /// Partially update a document by id
    fn update(&self, document: &QueryDocument) -> Result<RawResponse, TransportError>;

    /// Delete a document by id
    fn delete(&self, document: &QueryDocument) -> Result<RawResponse, TransportError>;

    /// Submit a bulk request; per-item results are returned verbatim
    fn bulk(&self, operations: &BulkRequest) -> Result<RawResponse, TransportError>;
}

impl<T: SearchClient + ?Sized> SearchClient for &T {
    fn search(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        (**self).search(document)
    }

    fn get(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        (**self).get(document)
    }

    fn index(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        (**self).index(document)
    }

    fn update(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        (**self).update(document)
    }

    fn delete(&self, document: &QueryDocument) -> Result<RawResponse, TransportError> {
        (**self).delete(document)
    }

    fn bulk(&self, operations: &BulkRequest) -> Result<RawResponse, TransportError> {
        (**self).bulk(operations)
    }
}
