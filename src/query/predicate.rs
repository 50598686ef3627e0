//! Predicates and predicate sets
//!
//! A [`PredicateSet`] accumulates normalized predicates keyed by boolean
//! bucket. Ingestion does all the alias handling up front, so the compiler
//! only ever sees one of four buckets and a resolved [`Operator`].

use super::verbs::{Verb, VerbArgs};
use crate::error::{BuilderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boolean bucket a predicate is combined under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Must,
    MustNot,
    Should,
    Filter,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Must, Bucket::MustNot, Bucket::Should, Bucket::Filter];

    /// Wire name of the bucket
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Must => "must",
            Bucket::MustNot => "must_not",
            Bucket::Should => "should",
            Bucket::Filter => "filter",
        }
    }

    /// Parse a bucket name, accepting `mustnot` as an alias of `must_not`
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "must" => Ok(Bucket::Must),
            "must_not" | "mustnot" => Ok(Bucket::MustNot),
            "should" => Ok(Bucket::Should),
            "filter" => Ok(Bucket::Filter),
            _ => Err(BuilderError::BooleanOperator {
                bucket: name.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound of a range clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeBound {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeBound::Gt => "gt",
            RangeBound::Gte => "gte",
            RangeBound::Lt => "lt",
            RangeBound::Lte => "lte",
        }
    }
}

/// Normalized predicate operator
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Term,
    Terms,
    Match,
    Range(RangeBound),
    Exists,
    Missing,
    /// Condition is a nested predicate set
    Sub,
    /// Unrecognized operator; compiles to match-all
    Other(String),
}

impl Operator {
    /// Resolve an already trimmed, lowercased operator string
    pub fn parse(operator: &str) -> Self {
        match operator {
            "=" | "term" => Operator::Term,
            "in" | "terms" => Operator::Terms,
            "like" | "match" | "multi_match" | "matchs" | "multimatch" => Operator::Match,
            ">" | "gt" => Operator::Range(RangeBound::Gt),
            ">=" | "gte" => Operator::Range(RangeBound::Gte),
            "<" | "lt" => Operator::Range(RangeBound::Lt),
            "<=" | "lte" => Operator::Range(RangeBound::Lte),
            "exists" | "exist" => Operator::Exists,
            "miss" | "missing" => Operator::Missing,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Term => f.write_str("term"),
            Operator::Terms => f.write_str("terms"),
            Operator::Match => f.write_str("match"),
            Operator::Range(bound) => f.write_str(bound.as_str()),
            Operator::Exists => f.write_str("exists"),
            Operator::Missing => f.write_str("missing"),
            Operator::Sub => f.write_str("sub"),
            Operator::Other(op) => write!(f, "{op:?}"),
        }
    }
}

/// What a predicate tests: one field, several fields, or a nested set
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Field(String),
    Fields(Vec<String>),
    Sub(PredicateSet),
}

impl Column {
    pub fn is_empty(&self) -> bool {
        match self {
            Column::Field(name) => name.is_empty(),
            Column::Fields(names) => names.is_empty(),
            Column::Sub(set) => set.is_empty(),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Field(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Field(name)
    }
}

impl From<Vec<String>> for Column {
    fn from(names: Vec<String>) -> Self {
        Column::Fields(names)
    }
}

impl From<Vec<&str>> for Column {
    fn from(names: Vec<&str>) -> Self {
        Column::Fields(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Column {
    fn from(names: &[&str]) -> Self {
        Column::Fields(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Column {
    fn from(names: [&str; N]) -> Self {
        Column::Fields(names.iter().map(|name| name.to_string()).collect())
    }
}

/// True for null, empty strings, empty arrays and empty objects
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A single normalized condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub bucket: Bucket,
    pub column: Column,
    pub operator: Operator,
    /// `Value::Null` when absent
    pub value: Value,
    /// Relevance weight; zero or below means unset
    pub boost: f64,
}

/// Predicates grouped by bucket, in first-use bucket order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    buckets: Vec<(Bucket, Vec<Predicate>)>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of predicates across all buckets
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|(_, preds)| preds.len()).sum()
    }

    /// Buckets with their predicates, in the order buckets were first used
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[Predicate])> + '_ {
        self.buckets
            .iter()
            .map(|(bucket, preds)| (*bucket, preds.as_slice()))
    }

    /// Predicates stored under one bucket
    pub fn predicates(&self, bucket: Bucket) -> &[Predicate] {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, preds)| preds.as_slice())
            .unwrap_or(&[])
    }

    /// Add a predicate under a bucket given by name
    ///
    /// Fails with [`BuilderError::BooleanOperator`] when the bucket is not
    /// one of `must`, `must_not` (or `mustnot`), `should`, `filter`. A
    /// [`Column::Sub`] column always stores a sub-query; a string `value`
    /// then names the bucket it is combined under.
    pub fn add(
        &mut self,
        bucket: &str,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> Result<&mut Self> {
        let bucket = Bucket::parse(bucket)?;
        let column = column.into();
        let value = value.into();
        let bucket = Self::resolve_bucket(bucket, &column, &value)?;
        self.insert(bucket, column, operator, value, boost);
        Ok(self)
    }

    /// Add a nested sub-query
    ///
    /// A fresh child set is handed to `build`, which runs before this call
    /// returns. `bucket_override` replaces the bucket, typically `should`
    /// for "or" groups.
    pub fn add_sub<F>(
        &mut self,
        bucket: &str,
        bucket_override: Option<&str>,
        build: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut PredicateSet),
    {
        let bucket = match bucket_override.filter(|name| !name.is_empty()) {
            Some(name) => Bucket::parse(name)?,
            None => Bucket::parse(bucket)?,
        };
        self.push_sub(bucket, build);
        Ok(self)
    }

    /// Add a predicate through the verb table
    ///
    /// Fails only when a sub-query column carries a bucket override that is
    /// not a known bucket.
    pub fn apply(&mut self, verb: Verb, args: VerbArgs) -> Result<&mut Self> {
        let (column, operator, value, boost) = args.into_parts(verb);
        let bucket = Self::resolve_bucket(verb.bucket(), &column, &value)?;
        self.insert(bucket, column, &operator, value, boost);
        Ok(self)
    }

    /// `must` predicate with an explicit operator
    pub fn where_(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        let args = VerbArgs::Operator(column.into(), operator.to_string(), value.into());
        self.record(Verb::Where, args)
    }

    /// `must` equality predicate; list values become set membership
    pub fn where_eq(&mut self, column: impl Into<Column>, value: impl Into<Value>) -> &mut Self {
        self.record(Verb::Where, VerbArgs::Value(column.into(), value.into()))
    }

    /// `must` predicate carrying a relevance boost
    pub fn where_boosted(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> &mut Self {
        self.record(
            Verb::Where,
            VerbArgs::Boosted(column.into(), operator.to_string(), value.into(), boost),
        )
    }

    pub fn where_in(&mut self, column: impl Into<Column>, values: impl Into<Value>) -> &mut Self {
        self.record(Verb::WhereIn, VerbArgs::Value(column.into(), values.into()))
    }

    pub fn where_not_in(
        &mut self,
        column: impl Into<Column>,
        values: impl Into<Value>,
    ) -> &mut Self {
        self.record(Verb::WhereNotIn, VerbArgs::Value(column.into(), values.into()))
    }

    pub fn filter(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        let args = VerbArgs::Operator(column.into(), operator.to_string(), value.into());
        self.record(Verb::Filter, args)
    }

    pub fn filter_eq(&mut self, column: impl Into<Column>, value: impl Into<Value>) -> &mut Self {
        self.record(Verb::Filter, VerbArgs::Value(column.into(), value.into()))
    }

    pub fn filter_in(&mut self, column: impl Into<Column>, values: impl Into<Value>) -> &mut Self {
        self.record(Verb::FilterIn, VerbArgs::Value(column.into(), values.into()))
    }

    pub fn filter_not_in(
        &mut self,
        column: impl Into<Column>,
        values: impl Into<Value>,
    ) -> &mut Self {
        self.record(Verb::FilterNotIn, VerbArgs::Value(column.into(), values.into()))
    }

    /// `should` predicate with an explicit operator
    pub fn or_where(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        let args = VerbArgs::Operator(column.into(), operator.to_string(), value.into());
        self.record(Verb::OrWhere, args)
    }

    pub fn or_where_eq(&mut self, column: impl Into<Column>, value: impl Into<Value>) -> &mut Self {
        self.record(Verb::OrWhere, VerbArgs::Value(column.into(), value.into()))
    }

    pub fn or_where_boosted(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
        boost: f64,
    ) -> &mut Self {
        self.record(
            Verb::OrWhere,
            VerbArgs::Boosted(column.into(), operator.to_string(), value.into(), boost),
        )
    }

    pub fn or_filter(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        let args = VerbArgs::Operator(column.into(), operator.to_string(), value.into());
        self.record(Verb::OrFilter, args)
    }

    pub fn exists(&mut self, column: impl Into<Column>) -> &mut Self {
        self.record(Verb::Exists, VerbArgs::Column(column.into()))
    }

    pub fn missing(&mut self, column: impl Into<Column>) -> &mut Self {
        self.record(Verb::Missing, VerbArgs::Column(column.into()))
    }

    /// Nested group combined with `must`
    pub fn where_sub<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.push_sub(Bucket::Must, build);
        self
    }

    /// Nested group combined with `should`
    pub fn or_where_sub<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.push_sub(Bucket::Should, build);
        self
    }

    /// Nested group combined with `filter`
    pub fn filter_sub<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut PredicateSet),
    {
        self.push_sub(Bucket::Filter, build);
        self
    }

    fn push_sub<F>(&mut self, bucket: Bucket, build: F)
    where
        F: FnOnce(&mut PredicateSet),
    {
        let mut child = PredicateSet::new();
        build(&mut child);
        self.push(Predicate {
            bucket,
            column: Column::Sub(child),
            operator: Operator::Sub,
            value: Value::Null,
            boost: 0.0,
        });
    }

    /// Shorthand entry: an unknown sub-query bucket override keeps the verb's bucket
    fn record(&mut self, verb: Verb, args: VerbArgs) -> &mut Self {
        let (column, operator, value, boost) = args.into_parts(verb);
        let bucket = Self::resolve_bucket(verb.bucket(), &column, &value).unwrap_or_else(|e| {
            tracing::warn!("{}, keeping {} for {} sub-query", e, verb.bucket(), verb);
            verb.bucket()
        });
        self.insert(bucket, column, &operator, value, boost);
        self
    }

    /// Bucket for a predicate; a sub-query column takes a non-empty string
    /// value as its bucket override
    fn resolve_bucket(bucket: Bucket, column: &Column, value: &Value) -> Result<Bucket> {
        match (column, value) {
            (Column::Sub(_), Value::String(name)) if !name.trim().is_empty() => Bucket::parse(name),
            _ => Ok(bucket),
        }
    }

    /// Normalize and store one predicate
    fn insert(
        &mut self,
        bucket: Bucket,
        column: Column,
        operator: &str,
        value: Value,
        boost: f64,
    ) {
        if let Column::Sub(_) = column {
            self.push(Predicate {
                bucket,
                column,
                operator: Operator::Sub,
                value: Value::Null,
                boost: 0.0,
            });
            return;
        }

        let mut bucket = bucket;
        let mut operator = operator.trim().to_lowercase();

        if bucket == Bucket::Must {
            if let Some(rest) = operator.strip_prefix('!') {
                bucket = Bucket::MustNot;
                operator = rest.to_string();
            }
            if let Some(rest) = operator.strip_prefix("not") {
                bucket = Bucket::MustNot;
                operator = rest.to_string();
            }
        }

        let operator = match Operator::parse(operator.trim()) {
            Operator::Term if value.is_array() => Operator::Terms,
            other => other,
        };

        self.push(Predicate {
            bucket,
            column,
            operator,
            value,
            boost,
        });
    }

    fn push(&mut self, predicate: Predicate) {
        match self.buckets.iter_mut().find(|(b, _)| *b == predicate.bucket) {
            Some((_, preds)) => preds.push(predicate),
            None => self.buckets.push((predicate.bucket, vec![predicate])),
        }
    }
}
