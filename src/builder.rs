//! Fluent query builder
//!
//! [`Builder`] is the mutable side: chained calls record predicates and
//! structural options. [`Builder::to_query`] is the single compile step that
//! produces an immutable [`QueryDocument`]; terminal operations compile, call
//! the [`SearchClient`], and reshape the response.
//!
//! ```rust
//! use esbuilder::{Builder, BulkRequest, QueryDocument, RawResponse, SearchClient, TransportError};
//! use serde_json::json;
//!
//! struct Offline;
//!
//! impl SearchClient for Offline {
//!     fn search(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//!     fn get(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//!     fn index(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//!     fn update(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//!     fn delete(&self, _: &QueryDocument) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//!     fn bulk(&self, _: &BulkRequest) -> Result<RawResponse, TransportError> { Ok(json!({})) }
//! }
//!
//! let document = Builder::new(Offline)
//!     .set_index("users")
//!     .where_("age", ">", 1)
//!     .limit(0, 20)
//!     .to_query()
//!     .unwrap();
//!
//! assert_eq!(
//!     document.body().unwrap()["query"],
//!     json!({"bool": {"must": [{"range": {"age": {"gt": 1}}}]}})
//! );
//! ```

use crate::client::{BulkRequest, RawResponse, SearchClient};
use crate::config::Config;
use crate::document::{
    BodyOverride, Direction, DocumentAssembler, QueryDocument, QuerySpec, SortOrder,
};
use crate::error::{BuilderError, Result};
use crate::query::{is_empty_value, Column, PredicateSet, Verb, VerbArgs};
use crate::response::{Record, ResponseReshaper, ResultSet};
use serde_json::{json, Value};

/// Fluent builder bound to a search client
///
/// Not meant to be shared between threads while mutating; use one builder
/// per logical call chain.
pub struct Builder<C: SearchClient> {
    client: C,
    spec: QuerySpec,
    predicates: PredicateSet,
    default_type: String,
    default_direction: Direction,
    merge_source: bool,
}

impl<C: SearchClient> Builder<C> {
    /// Create a builder with default settings
    pub fn new(client: C) -> Self {
        Self::with_config(client, &Config::default())
    }

    /// Create a builder using configured defaults
    pub fn with_config(client: C, config: &Config) -> Self {
        Self {
            client,
            spec: QuerySpec::new("", config.index.default_type.clone()),
            predicates: PredicateSet::new(),
            default_type: config.index.default_type.clone(),
            default_direction: config.query.direction(),
            merge_source: config.query.merge_source,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    // ---- target -------------------------------------------------------

    /// Target index, with the default document type
    pub fn set_index(mut self, name: impl Into<String>) -> Self {
        self.spec.index = name.into();
        self.spec.doc_type = self.default_type.clone();
        self
    }

    /// Target index and document type; an empty type keeps the current one
    pub fn set_index_with_type(
        mut self,
        name: impl Into<String>,
        doc_type: impl Into<String>,
    ) -> Self {
        self.spec.index = name.into();
        let doc_type = doc_type.into();
        if !doc_type.is_empty() {
            self.spec.doc_type = doc_type;
        }
        self
    }

    pub fn set_type(mut self, doc_type: impl Into<String>) -> Self {
        self.spec.doc_type = doc_type.into();
        self
    }

    pub fn set_id(mut self, id: impl ToString) -> Self {
        self.assign_id(id.to_string());
        self
    }

    /// Replace the generated body
    ///
    /// Objects and arrays are sent as-is; any other truthy value suppresses
    /// the body; null or empty values clear a previous override.
    pub fn set_body(mut self, body: Value) -> Self {
        self.spec.body = BodyOverride::from_value(body);
        self
    }

    /// Send no body at all
    pub fn suppress_body(mut self) -> Self {
        self.spec.body = Some(BodyOverride::Suppress);
        self
    }

    // ---- structure ----------------------------------------------------

    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = offset;
        self
    }

    pub fn from(self, offset: u64) -> Self {
        self.offset(offset)
    }

    /// Page size; zero leaves pagination unset
    pub fn size(mut self, size: u64) -> Self {
        self.spec.size = size;
        self
    }

    pub fn take(self, size: u64) -> Self {
        self.size(size)
    }

    pub fn limit(self, offset: u64, size: u64) -> Self {
        self.offset(offset).size(size)
    }

    /// Single-argument limit: `size` rows from offset zero
    pub fn limit_size(self, size: u64) -> Self {
        self.limit(0, size)
    }

    /// Fields to return
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.source = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn source<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(fields)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.spec.sort.push(SortOrder::new(field, direction));
        self
    }

    /// Sort by a field in the configured default direction
    pub fn order(self, field: impl Into<String>) -> Self {
        let direction = self.default_direction;
        self.order_by(field, direction)
    }

    /// De-duplicate hits on a field and count distinct values
    pub fn collapse(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.spec.collapse = (!field.is_empty()).then_some(field);
        self
    }

    pub fn distinct(self, field: impl Into<String>) -> Self {
        self.collapse(field)
    }

    /// Group results by a field's values
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.spec.group_by = (!field.is_empty()).then_some(field);
        self
    }

    // ---- predicates ---------------------------------------------------

    /// Add a predicate under a bucket given by name
    pub fn add_where(
        mut self,
        bucket: &str,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> Result<Self> {
        self.predicates.add(bucket, column, operator, value, boost)?;
        Ok(self)
    }

    /// Add a sub-query under a bucket given by name, optionally overridden
    pub fn add_sub<F>(
        mut self,
        bucket: &str,
        bucket_override: Option<&str>,
        build: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.predicates.add_sub(bucket, bucket_override, build)?;
        Ok(self)
    }

    /// Add a predicate by verb name (`where`, `orFilter`, `whereNotIn`, ...)
    pub fn apply(mut self, verb: &str, args: VerbArgs) -> Result<Self> {
        let verb = Verb::lookup(verb).ok_or_else(|| BuilderError::UnknownVerb {
            verb: verb.to_string(),
        })?;
        self.predicates.apply(verb, args)?;
        Ok(self)
    }

    pub fn where_(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.predicates.where_(column, operator, value);
        self
    }

    pub fn where_eq(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.predicates.where_eq(column, value);
        self
    }

    pub fn where_boosted(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> Self {
        self.predicates.where_boosted(column, operator, value, boost);
        self
    }

    pub fn where_in(mut self, column: impl Into<Column>, values: impl Into<Value>) -> Self {
        self.predicates.where_in(column, values);
        self
    }

    pub fn where_not_in(mut self, column: impl Into<Column>, values: impl Into<Value>) -> Self {
        self.predicates.where_not_in(column, values);
        self
    }

    pub fn filter(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.predicates.filter(column, operator, value);
        self
    }

    pub fn filter_eq(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.predicates.filter_eq(column, value);
        self
    }

    pub fn filter_in(mut self, column: impl Into<Column>, values: impl Into<Value>) -> Self {
        self.predicates.filter_in(column, values);
        self
    }

    pub fn filter_not_in(mut self, column: impl Into<Column>, values: impl Into<Value>) -> Self {
        self.predicates.filter_not_in(column, values);
        self
    }

    pub fn or_where(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.predicates.or_where(column, operator, value);
        self
    }

    pub fn or_where_eq(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.predicates.or_where_eq(column, value);
        self
    }

    pub fn or_where_boosted(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> Self {
        self.predicates.or_where_boosted(column, operator, value, boost);
        self
    }

    pub fn or_filter(
        mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.predicates.or_filter(column, operator, value);
        self
    }

    pub fn exists(mut self, column: impl Into<Column>) -> Self {
        self.predicates.exists(column);
        self
    }

    pub fn missing(mut self, column: impl Into<Column>) -> Self {
        self.predicates.missing(column);
        self
    }

    pub fn where_sub<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.predicates.where_sub(build);
        self
    }

    pub fn or_where_sub<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.predicates.or_where_sub(build);
        self
    }

    pub fn filter_sub<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.predicates.filter_sub(build);
        self
    }

    // ---- compile ------------------------------------------------------

    /// Compile the current state into a request document
    pub fn to_query(&self) -> Result<QueryDocument> {
        DocumentAssembler::assemble(&self.spec, &self.predicates)
    }

    fn to_query_with(&self, body: BodyOverride) -> Result<QueryDocument> {
        DocumentAssembler::assemble_with(&self.spec, &body)
    }

    // ---- terminal operations -----------------------------------------

    /// Run the search and return the untouched response
    pub fn get_raw(&self) -> Result<RawResponse> {
        let document = self.to_query()?;
        tracing::debug!("search on {}", document.index());
        Ok(self.client.search(&document)?)
    }

    /// Search and reshape using the configured source merging
    pub fn get(&self) -> Result<ResultSet> {
        self.get_with(self.merge_source)
    }

    /// Search and reshape; `merge_source` flattens `_source` into records
    pub fn get_with(&self, merge_source: bool) -> Result<ResultSet> {
        let raw = self.get_raw()?;
        Ok(ResponseReshaper::reshape(raw, merge_source))
    }

    pub fn first(&self) -> Result<Option<Record>> {
        self.first_with(self.merge_source)
    }

    pub fn first_with(&self, merge_source: bool) -> Result<Option<Record>> {
        let result = self.get_with(merge_source)?;
        Ok(result.records.first().cloned())
    }

    /// Fetch one document by id; a given id replaces the builder's id
    pub fn find(&mut self, id: Option<&str>) -> Result<Option<Record>> {
        self.find_with(id, self.merge_source)
    }

    pub fn find_with(&mut self, id: Option<&str>, merge_source: bool) -> Result<Option<Record>> {
        self.resolve_id(id);
        let document = self.to_query_with(BodyOverride::Suppress)?;
        if document.id().is_none() {
            return Err(BuilderError::IdentifierRequired { operation: "find" });
        }

        tracing::debug!("get {:?} from {}", document.id(), document.index());
        let raw = self.client.get(&document)?;
        Ok(ResponseReshaper::document(raw, merge_source))
    }

    /// Total matching documents (distinct count when collapsing, groups when grouping)
    pub fn count(&self) -> Result<u64> {
        Ok(self.get_with(false)?.total)
    }

    /// Index one document, or bulk-insert when given an array
    pub fn insert(&self, doc: Value) -> Result<RawResponse> {
        match doc {
            Value::Array(rows) => self.bulk_insert(rows),
            Value::Object(fields) if !fields.is_empty() => {
                let document = self.to_query_with(BodyOverride::Raw(Value::Object(fields)))?;
                tracing::debug!("index into {} (id: {:?})", document.index(), document.id());
                Ok(self.client.index(&document)?)
            }
            _ => Err(BuilderError::EmptyInput { operation: "insert" }),
        }
    }

    /// Index many documents in one bulk request
    ///
    /// A row's `id` (or else `_id`) becomes the action's `_id`; both keys are
    /// stripped from the stored document. Per-item failures are left in the
    /// returned response.
    pub fn bulk_insert(&self, rows: Vec<Value>) -> Result<RawResponse> {
        if rows.is_empty() {
            return Err(BuilderError::EmptyInput {
                operation: "bulk_insert",
            });
        }
        if self.spec.index.is_empty() {
            return Err(BuilderError::MissingIndex);
        }

        let mut body = Vec::with_capacity(rows.len() * 2);
        for row in rows {
            let mut action = json!({
                "_index": self.spec.index,
                "_type": self.spec.doc_type,
            });

            let row = match row {
                Value::Object(mut fields) => {
                    let id = fields.remove("id").filter(|id| !id.is_null());
                    let underscore_id = fields.remove("_id").filter(|id| !id.is_null());
                    if let Some(id) = id.or(underscore_id) {
                        action["_id"] = id;
                    }
                    Value::Object(fields)
                }
                other => other,
            };

            body.push(json!({ "index": action }));
            body.push(row);
        }

        let operations = BulkRequest { body };
        tracing::debug!("bulk insert of {} documents into {}", operations.len(), self.spec.index);
        Ok(self.client.bulk(&operations)?)
    }

    /// Partially update a document; a given id replaces the builder's id
    pub fn update(&mut self, doc: Value, id: Option<&str>) -> Result<RawResponse> {
        self.resolve_id(id);
        if is_empty_value(&doc) {
            return Err(BuilderError::EmptyInput { operation: "update" });
        }

        let document = self.to_query_with(BodyOverride::Raw(json!({ "doc": doc })))?;
        if document.id().is_none() {
            return Err(BuilderError::IdentifierRequired { operation: "update" });
        }

        tracing::debug!("update {:?} in {}", document.id(), document.index());
        Ok(self.client.update(&document)?)
    }

    /// Delete a document; a given id replaces the builder's id
    pub fn delete(&mut self, id: Option<&str>) -> Result<RawResponse> {
        self.resolve_id(id);
        let document = self.to_query_with(BodyOverride::Suppress)?;
        if document.id().is_none() {
            return Err(BuilderError::IdentifierRequired { operation: "delete" });
        }

        tracing::debug!("delete {:?} from {}", document.id(), document.index());
        Ok(self.client.delete(&document)?)
    }

    fn resolve_id(&mut self, id: Option<&str>) {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.assign_id(id.to_string());
        }
    }

    fn assign_id(&mut self, id: String) {
        self.spec.id = (!id.is_empty()).then_some(id);
    }
}
