//! Verb table
//!
//! Every fluent predicate call resolves through one static table mapping a
//! verb name to the bucket and default operator it stores under. Names that
//! are not in the table are rejected rather than guessed.

use super::predicate::{Bucket, Column};
use serde_json::Value;

/// A predicate-building verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Where,
    WhereIn,
    Filter,
    FilterIn,
    OrWhere,
    OrFilter,
    WhereNotIn,
    FilterNotIn,
    Exists,
    Missing,
}

/// Verb name → (verb, bucket, default operator)
static VERB_TABLE: &[(&str, Verb, Bucket, &str)] = &[
    ("where", Verb::Where, Bucket::Must, "="),
    ("whereIn", Verb::WhereIn, Bucket::Must, "="),
    ("filter", Verb::Filter, Bucket::Filter, "="),
    ("filterIn", Verb::FilterIn, Bucket::Filter, "="),
    ("orWhere", Verb::OrWhere, Bucket::Should, "="),
    ("orFilter", Verb::OrFilter, Bucket::Should, "="),
    ("whereNotIn", Verb::WhereNotIn, Bucket::MustNot, "in"),
    ("filterNotIn", Verb::FilterNotIn, Bucket::MustNot, "in"),
    ("exists", Verb::Exists, Bucket::Must, "exists"),
    ("exist", Verb::Exists, Bucket::Must, "exists"),
    ("missing", Verb::Missing, Bucket::Must, "missing"),
    ("miss", Verb::Missing, Bucket::Must, "missing"),
];

impl Verb {
    /// Resolve a verb by its call name
    pub fn lookup(name: &str) -> Option<Self> {
        VERB_TABLE
            .iter()
            .find(|(verb_name, ..)| *verb_name == name)
            .map(|(_, verb, ..)| *verb)
    }

    fn entry(self) -> &'static (&'static str, Verb, Bucket, &'static str) {
        // Every variant has at least one row
        VERB_TABLE
            .iter()
            .find(|(_, verb, ..)| *verb == self)
            .unwrap_or(&VERB_TABLE[0])
    }

    /// Canonical call name
    pub fn name(self) -> &'static str {
        self.entry().0
    }

    /// Bucket the verb stores predicates under
    pub fn bucket(self) -> Bucket {
        self.entry().2
    }

    /// Operator used when the call does not name one
    pub fn default_operator(self) -> &'static str {
        self.entry().3
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Positional arguments of a verb call
///
/// Mirrors the accepted arities: column only, column and value (using the
/// verb's default operator), column with explicit operator and value, and
/// the same with a relevance boost.
#[derive(Debug, Clone, PartialEq)]
pub enum VerbArgs {
    Column(Column),
    Value(Column, Value),
    Operator(Column, String, Value),
    Boosted(Column, String, Value, f64),
}

impl VerbArgs {
    pub(crate) fn into_parts(self, verb: Verb) -> (Column, String, Value, f64) {
        match self {
            VerbArgs::Column(column) => {
                (column, verb.default_operator().to_string(), Value::Null, 0.0)
            }
            VerbArgs::Value(column, value) => {
                (column, verb.default_operator().to_string(), value, 0.0)
            }
            VerbArgs::Operator(column, operator, value) => (column, operator, value, 0.0),
            VerbArgs::Boosted(column, operator, value, boost) => (column, operator, value, boost),
        }
    }
}
