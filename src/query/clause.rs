//! Leaf clause translation
//!
//! Maps one normalized [`Predicate`] to a leaf query clause:
//!
//! ```text
//! =, term                 {"term":  {field: value}}
//! in, terms               {"terms": {field: [values]}}
//! like, match             {"match": {field: text}}
//! like on several fields  {"multi_match": {"query": text, "fields": [...]}}
//! >, >=, <, <=            {"range": {field: {"gt": value}}}
//! exists, missing         {"exists": {"field": field}}
//! ```
//!
//! A positive boost wraps the value so the clause carries a `boost` key.
//! Predicates with an empty column or value produce no clause at all.

use super::predicate::{is_empty_value, Column, Operator, Predicate, RangeBound};
use serde_json::{json, Map, Value};

/// Leaf clause translator
pub struct ClauseTranslator;

impl ClauseTranslator {
    /// Translate a predicate, or `None` when it is suppressed
    ///
    /// Sub-query predicates are compiled by [`super::QueryCompiler`] and
    /// always yield `None` here.
    pub fn translate(predicate: &Predicate) -> Option<Value> {
        match &predicate.operator {
            Operator::Term if predicate.value.is_array() => Self::keyed("terms", predicate),
            Operator::Term => Self::keyed("term", predicate),
            Operator::Terms => Self::keyed("terms", predicate),
            Operator::Match => Self::full_text(predicate),
            Operator::Range(bound) => Self::range(*bound, predicate),
            Operator::Exists => Self::presence("exists", predicate),
            Operator::Missing => Self::presence("missing", predicate),
            Operator::Sub => None,
            Operator::Other(op) => {
                tracing::warn!(
                    "Unrecognized operator {:?} in {} bucket, compiling to match_all",
                    op,
                    predicate.bucket
                );
                Some(Self::match_all())
            }
        }
    }

    /// Clause matching every document
    pub fn match_all() -> Value {
        json!({ "match_all": {} })
    }

    /// term / terms: `{kind: {field: value}}`
    fn keyed(kind: &str, predicate: &Predicate) -> Option<Value> {
        let field = Self::field(&predicate.column)?;
        if is_empty_value(&predicate.value) {
            return None;
        }

        let inner = match Self::boost(predicate) {
            Some(boost) => json!({ "value": predicate.value, "boost": boost }),
            None => predicate.value.clone(),
        };
        Some(Self::wrap(kind, field, inner))
    }

    fn full_text(predicate: &Predicate) -> Option<Value> {
        if predicate.column.is_empty() || is_empty_value(&predicate.value) {
            return None;
        }

        match &predicate.column {
            Column::Fields(fields) => {
                let mut body = Map::new();
                body.insert("query".to_string(), predicate.value.clone());
                body.insert("fields".to_string(), json!(fields));
                if let Some(boost) = Self::boost(predicate) {
                    body.insert("boost".to_string(), json!(boost));
                }
                Some(json!({ "multi_match": body }))
            }
            Column::Field(field) => {
                let inner = match Self::boost(predicate) {
                    Some(boost) => json!({ "query": predicate.value, "boost": boost }),
                    None => predicate.value.clone(),
                };
                Some(Self::wrap("match", field, inner))
            }
            Column::Sub(_) => None,
        }
    }

    fn range(bound: RangeBound, predicate: &Predicate) -> Option<Value> {
        let field = Self::field(&predicate.column)?;
        if is_empty_value(&predicate.value) {
            return None;
        }

        let mut limits = Map::new();
        limits.insert(bound.as_str().to_string(), predicate.value.clone());
        if let Some(boost) = Self::boost(predicate) {
            limits.insert("boost".to_string(), json!(boost));
        }
        Some(Self::wrap("range", field, Value::Object(limits)))
    }

    /// exists / missing only need a column
    fn presence(kind: &str, predicate: &Predicate) -> Option<Value> {
        let field = Self::field(&predicate.column)?;

        let mut body = Map::new();
        body.insert("field".to_string(), json!(field));
        if let Some(boost) = Self::boost(predicate) {
            body.insert("boost".to_string(), json!(boost));
        }

        let mut clause = Map::new();
        clause.insert(kind.to_string(), Value::Object(body));
        Some(Value::Object(clause))
    }

    fn field(column: &Column) -> Option<&str> {
        match column {
            Column::Field(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    fn boost(predicate: &Predicate) -> Option<f64> {
        (predicate.boost > 0.0).then_some(predicate.boost)
    }

    fn wrap(kind: &str, field: &str, inner: Value) -> Value {
        let mut by_field = Map::new();
        by_field.insert(field.to_string(), inner);

        let mut clause = Map::new();
        clause.insert(kind.to_string(), Value::Object(by_field));
        Value::Object(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predicate::{Bucket, PredicateSet};

    fn single(build: impl FnOnce(&mut PredicateSet)) -> Predicate {
        let mut set = PredicateSet::new();
        build(&mut set);
        let pred = set
            .buckets()
            .flat_map(|(_, preds)| preds.iter().cloned())
            .next()
            .expect("one predicate");
        pred
    }

    #[test]
    fn test_term_clause() {
        let pred = single(|q| {
            q.where_eq("name", "alice");
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"term": {"name": "alice"}}))
        );
    }

    #[test]
    fn test_hand_built_term_with_list_is_terms() {
        let pred = Predicate {
            bucket: Bucket::Must,
            column: Column::Field("id".to_string()),
            operator: Operator::Term,
            value: json!([1, 2]),
            boost: 0.0,
        };
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"terms": {"id": [1, 2]}}))
        );
    }

    #[test]
    fn test_term_clause_with_boost() {
        let pred = single(|q| {
            q.where_boosted("name", "=", "alice", 2.5);
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"term": {"name": {"value": "alice", "boost": 2.5}}}))
        );
    }

    #[test]
    fn test_terms_clause_with_boost_wraps_value() {
        let pred = single(|q| {
            q.where_boosted("id", "in", json!([1, 2]), 1.5);
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"terms": {"id": {"value": [1, 2], "boost": 1.5}}}))
        );
    }

    #[test]
    fn test_negative_boost_is_ignored() {
        let pred = single(|q| {
            q.where_boosted("age", ">=", 18, -1.0);
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"range": {"age": {"gte": 18}}}))
        );
    }

    #[test]
    fn test_match_and_multi_match() {
        let pred = single(|q| {
            q.where_("title", "like", "rust book");
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"match": {"title": "rust book"}}))
        );

        let pred = single(|q| {
            q.where_boosted(["title", "summary"], "match", "rust", 3.0);
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"multi_match": {
                "query": "rust",
                "fields": ["title", "summary"],
                "boost": 3.0
            }}))
        );
    }

    #[test]
    fn test_match_with_boost_uses_query_key() {
        let pred = single(|q| {
            q.or_where_boosted("title", "like", "rust", 2.0);
        });
        assert_eq!(pred.bucket, Bucket::Should);
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"match": {"title": {"query": "rust", "boost": 2.0}}}))
        );
    }

    #[test]
    fn test_range_bounds() {
        let cases = [(">", "gt"), (">=", "gte"), ("<", "lt"), ("<=", "lte"), ("lte", "lte")];
        for (op, bound) in cases {
            let pred = single(|q| {
                q.where_("age", op, 30);
            });
            assert_eq!(
                ClauseTranslator::translate(&pred),
                Some(json!({"range": {"age": {bound: 30}}}))
            );
        }
    }

    #[test]
    fn test_exists_and_missing_need_only_column() {
        let pred = single(|q| {
            q.exists("email");
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"exists": {"field": "email"}}))
        );

        let pred = single(|q| {
            q.missing("deleted_at");
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"missing": {"field": "deleted_at"}}))
        );

        let pred = single(|q| {
            q.exists("");
        });
        assert_eq!(ClauseTranslator::translate(&pred), None);
    }

    #[test]
    fn test_empty_value_or_column_is_suppressed() {
        let cases: Vec<Predicate> = vec![
            single(|q| {
                q.where_eq("name", "");
            }),
            single(|q| {
                q.where_eq("", "alice");
            }),
            single(|q| {
                q.where_in("id", json!([]));
            }),
            single(|q| {
                q.where_("title", "like", serde_json::Value::Null);
            }),
            single(|q| {
                q.where_("age", ">", serde_json::Value::Null);
            }),
        ];

        for pred in cases {
            assert_eq!(ClauseTranslator::translate(&pred), None, "{:?}", pred);
        }
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let pred = single(|q| {
            q.where_("score", ">", 0);
        });
        assert_eq!(
            ClauseTranslator::translate(&pred),
            Some(json!({"range": {"score": {"gt": 0}}}))
        );
    }

    #[test]
    fn test_unknown_operator_matches_all() {
        let pred = single(|q| {
            q.where_("name", "~=", "x");
        });
        assert_eq!(ClauseTranslator::translate(&pred), Some(ClauseTranslator::match_all()));
    }
}
