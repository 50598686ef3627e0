//! Recursive boolean query compiler
//!
//! Turns a [`PredicateSet`] into a single clause tree. A set with one
//! non-empty bucket compiles to a bare bucket map (`{"must": [...]}`), a set
//! with several buckets is wrapped in `{"bool": {...}}`, and a set that
//! produces no clauses at all compiles to `match_all`.

use super::clause::ClauseTranslator;
use super::predicate::{Bucket, Column, Operator, Predicate, PredicateSet};
use serde_json::{json, Map, Value};

/// Boolean query compiler
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a predicate set into its clause tree
    pub fn compile(set: &PredicateSet) -> Value {
        let mut tree = Map::new();

        for (bucket, predicates) in set.buckets() {
            let clauses: Vec<Value> =
                predicates.iter().filter_map(Self::compile_predicate).collect();
            if clauses.is_empty() {
                continue;
            }

            let merged = match bucket {
                Bucket::Filter => Self::merge_filter(clauses),
                _ => Self::merge(clauses),
            };
            tree.insert(bucket.as_str().to_string(), merged);
        }

        match tree.len() {
            0 => ClauseTranslator::match_all(),
            1 => Value::Object(tree),
            _ => json!({ "bool": tree }),
        }
    }

    /// Compile the value placed under `query`, which is always a bool container
    pub fn compile_query(set: &PredicateSet) -> Value {
        let tree = Self::compile(set);

        if tree.get("bool").is_some() {
            tree
        } else if Self::is_boolean_container(&tree) {
            json!({ "bool": tree })
        } else {
            json!({ "bool": { "must": [tree] } })
        }
    }

    /// True when a clause is a bare bucket map rather than a leaf
    pub fn is_boolean_container(clause: &Value) -> bool {
        clause
            .as_object()
            .is_some_and(|map| Bucket::ALL.iter().any(|bucket| map.contains_key(bucket.as_str())))
    }

    fn compile_predicate(predicate: &Predicate) -> Option<Value> {
        if let (Operator::Sub, Column::Sub(child)) = (&predicate.operator, &predicate.column) {
            return Some(Self::compile(child));
        }

        let clause = ClauseTranslator::translate(predicate);
        if clause.is_none() {
            tracing::trace!(
                "Suppressed {} predicate on {:?}: empty column or value",
                predicate.operator,
                predicate.column
            );
        }
        clause
    }

    /// Array of clauses; nested bucket maps become `{"bool": ...}` elements
    fn merge(clauses: Vec<Value>) -> Value {
        Value::Array(
            clauses
                .into_iter()
                .map(|clause| {
                    if Self::is_boolean_container(&clause) {
                        json!({ "bool": clause })
                    } else {
                        clause
                    }
                })
                .collect(),
        )
    }

    /// A lone nested bucket map nests as `filter.bool`
    fn merge_filter(mut clauses: Vec<Value>) -> Value {
        if clauses.len() == 1 && Self::is_boolean_container(&clauses[0]) {
            let nested = clauses.remove(0);
            return json!({ "bool": nested });
        }
        Self::merge(clauses)
    }
}
