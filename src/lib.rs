//! Esbuilder - Fluent Query Builder for Elasticsearch-style Engines
//!
//! Compiles chained predicate calls into a search request document, hands it
//! to a pluggable search client, and reshapes the response into flat records
//! or grouped records.

pub mod builder;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod response;

pub use builder::Builder;
pub use client::{BulkRequest, RawResponse, SearchClient, TransportError};
pub use config::Config;
pub use document::{BodyOverride, Direction, DocumentAssembler, QueryDocument, QuerySpec, SortOrder};
pub use error::{BuilderError, Result};
pub use query::{Bucket, Column, Operator, Predicate, PredicateSet, QueryCompiler, Verb, VerbArgs};
pub use response::{Group, Record, Records, ResponseReshaper, ResultSet};
