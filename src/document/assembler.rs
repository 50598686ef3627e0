//! Query document assembly
//!
//! Combines a compiled predicate tree with the structural options of a
//! [`QuerySpec`]. Two mutually exclusive modes exist:
//!
//! ```text
//! plain:  {size, from, sort, query, _source, collapse, aggs.count}
//! group:  {from: 0, size: 0, query,
//!          aggs.groupby.terms.field,
//!          aggs.groupby.aggs.grouplist.top_hits.{sort, size, _source.includes}}
//! ```

use super::spec::{BodyOverride, QuerySpec, SortOrder};
use crate::error::{BuilderError, Result};
use crate::query::{PredicateSet, QueryCompiler};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Compiled request, ready for a search client
///
/// Built fresh on every compile and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    index: String,
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

impl QueryDocument {
    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Wire form: `{"index", "type", "id"?, "body"?}`
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("index".to_string(), json!(self.index));
        doc.insert("type".to_string(), json!(self.doc_type));
        if let Some(id) = &self.id {
            doc.insert("id".to_string(), json!(id));
        }
        if let Some(body) = &self.body {
            doc.insert("body".to_string(), body.clone());
        }
        Value::Object(doc)
    }

    /// Pretty-printed wire form, for logging and inspection
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_value()).map_err(|e| BuilderError::Json {
            source: e,
            context: format!("Failed to render query document for {}", self.index),
        })
    }
}

/// Document assembler
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Assemble the search request for a spec and its predicates
    pub fn assemble(spec: &QuerySpec, predicates: &PredicateSet) -> Result<QueryDocument> {
        if spec.index.is_empty() {
            return Err(BuilderError::MissingIndex);
        }

        if let (Some(collapse), Some(group_by)) = (&spec.collapse, &spec.group_by) {
            return Err(BuilderError::ConflictingModes {
                collapse: collapse.clone(),
                group_by: group_by.clone(),
            });
        }

        if let Some(group_by) = &spec.group_by {
            tracing::debug!("Compiling group query on {} grouped by {}", spec.index, group_by);
            return Ok(QueryDocument {
                index: spec.index.clone(),
                doc_type: spec.doc_type.clone(),
                id: None,
                body: Some(Self::group_body(spec, predicates, group_by)),
            });
        }

        let body = match &spec.body {
            Some(body_override) => Self::override_body(body_override),
            None => Some(Self::plain_body(spec, predicates)),
        };
        Ok(Self::document(spec, body))
    }

    /// Assemble an id-addressed or write request with an explicit body
    ///
    /// Never enters group mode and ignores `spec.body`; the document keeps
    /// the spec's id.
    pub fn assemble_with(spec: &QuerySpec, body_override: &BodyOverride) -> Result<QueryDocument> {
        if spec.index.is_empty() {
            return Err(BuilderError::MissingIndex);
        }
        Ok(Self::document(spec, Self::override_body(body_override)))
    }

    fn override_body(body_override: &BodyOverride) -> Option<Value> {
        match body_override {
            BodyOverride::Raw(raw) => Some(raw.clone()),
            BodyOverride::Suppress => None,
        }
    }

    fn document(spec: &QuerySpec, body: Option<Value>) -> QueryDocument {
        tracing::debug!(
            "Compiled query on {} (id: {:?}, body: {})",
            spec.index,
            spec.id,
            body.is_some()
        );

        QueryDocument {
            index: spec.index.clone(),
            doc_type: spec.doc_type.clone(),
            id: spec.id.clone(),
            body,
        }
    }

    fn plain_body(spec: &QuerySpec, predicates: &PredicateSet) -> Value {
        let mut body = Map::new();

        if spec.size > 0 {
            body.insert("size".to_string(), json!(spec.size));
            body.insert("from".to_string(), json!(spec.offset));
        }
        if !spec.sort.is_empty() {
            body.insert("sort".to_string(), Self::sort_clause(&spec.sort));
        }

        body.insert("query".to_string(), QueryCompiler::compile_query(predicates));

        if !spec.source.is_empty() {
            body.insert("_source".to_string(), json!(spec.source));
        }

        if let Some(field) = &spec.collapse {
            body.insert("collapse".to_string(), json!({ "field": field }));
            body.insert(
                "aggs".to_string(),
                json!({ "count": { "cardinality": { "field": field } } }),
            );
        }

        Value::Object(body)
    }

    fn group_body(spec: &QuerySpec, predicates: &PredicateSet, group_by: &str) -> Value {
        let mut top_hits = Map::new();
        if !spec.sort.is_empty() {
            top_hits.insert("sort".to_string(), Self::sort_clause(&spec.sort));
        }
        if spec.size > 0 {
            top_hits.insert("size".to_string(), json!(spec.size));
        }
        if !spec.source.is_empty() {
            top_hits.insert("_source".to_string(), json!({ "includes": spec.source }));
        }

        json!({
            "from": 0,
            "size": 0,
            "query": QueryCompiler::compile_query(predicates),
            "aggs": {
                "groupby": {
                    "terms": { "field": group_by },
                    "aggs": { "grouplist": { "top_hits": top_hits } }
                }
            }
        })
    }

    /// `[{field: {"order": direction}}, ...]`
    fn sort_clause(sort: &[SortOrder]) -> Value {
        Value::Array(
            sort.iter()
                .map(|order| {
                    let mut clause = Map::new();
                    clause.insert(
                        order.field.clone(),
                        json!({ "order": order.direction.as_str() }),
                    );
                    Value::Object(clause)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Direction;

    fn spec(index: &str) -> QuerySpec {
        QuerySpec::new(index, "_doc")
    }

    #[test]
    fn test_missing_index_fails() {
        let err =
            DocumentAssembler::assemble(&QuerySpec::default(), &PredicateSet::new()).unwrap_err();
        assert!(matches!(err, BuilderError::MissingIndex));
    }

    #[test]
    fn test_plain_pagination_and_query() {
        let mut s = spec("users");
        s.size = 20;
        let mut preds = PredicateSet::new();
        preds.where_("age", ">", 1);

        let doc = DocumentAssembler::assemble(&s, &preds).unwrap();
        assert_eq!(
            doc.body(),
            Some(&json!({
                "size": 20,
                "from": 0,
                "query": {"bool": {"must": [{"range": {"age": {"gt": 1}}}]}}
            }))
        );
    }

    #[test]
    fn test_zero_size_never_paginates() {
        let mut s = spec("users");
        s.offset = 40;

        let doc = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap();
        let body = doc.body().unwrap();
        assert!(body.get("size").is_none());
        assert!(body.get("from").is_none());
    }

    #[test]
    fn test_sort_projection_and_collapse() {
        let mut s = spec("users");
        s.sort = vec![
            SortOrder::new("age", Direction::Desc),
            SortOrder::new("name", Direction::Asc),
        ];
        s.source = vec!["name".to_string(), "age".to_string()];
        s.collapse = Some("email".to_string());

        let doc = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap();
        let body = doc.body().unwrap();
        assert_eq!(
            body["sort"],
            json!([{"age": {"order": "desc"}}, {"name": {"order": "asc"}}])
        );
        assert_eq!(body["_source"], json!(["name", "age"]));
        assert_eq!(body["collapse"], json!({"field": "email"}));
        assert_eq!(body["aggs"], json!({"count": {"cardinality": {"field": "email"}}}));
    }

    #[test]
    fn test_raw_body_replaces_generated() {
        let mut s = spec("users");
        s.size = 5;
        s.id = Some("7".to_string());
        s.body = Some(BodyOverride::Raw(json!({"doc": {"name": "x"}})));

        let doc = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap();
        assert_eq!(doc.body(), Some(&json!({"doc": {"name": "x"}})));
        assert_eq!(doc.id(), Some("7"));
    }

    #[test]
    fn test_suppressed_body_is_omitted() {
        let mut s = spec("users");
        s.id = Some("7".to_string());

        let doc = DocumentAssembler::assemble_with(&s, &BodyOverride::Suppress).unwrap();
        assert_eq!(doc.body(), None);
        assert_eq!(doc.to_value(), json!({"index": "users", "type": "_doc", "id": "7"}));
    }

    #[test]
    fn test_explicit_body_bypasses_group_mode() {
        let mut s = spec("users");
        s.id = Some("7".to_string());
        s.group_by = Some("city".to_string());
        s.collapse = Some("email".to_string());

        let doc =
            DocumentAssembler::assemble_with(&s, &BodyOverride::Raw(json!({"name": "alice"})))
                .unwrap();
        assert_eq!(doc.id(), Some("7"));
        assert_eq!(doc.body(), Some(&json!({"name": "alice"})));
    }

    #[test]
    fn test_group_mode_without_predicates() {
        let mut s = spec("users");
        s.group_by = Some("city".to_string());

        let doc = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap();
        assert_eq!(
            doc.body(),
            Some(&json!({
                "from": 0,
                "size": 0,
                "query": {"bool": {"must": [{"match_all": {}}]}},
                "aggs": {"groupby": {
                    "terms": {"field": "city"},
                    "aggs": {"grouplist": {"top_hits": {}}}
                }}
            }))
        );
    }

    #[test]
    fn test_group_mode_relocates_sort_size_and_source() {
        let mut s = spec("users");
        s.group_by = Some("city".to_string());
        s.size = 3;
        s.offset = 10;
        s.sort = vec![SortOrder::new("age", Direction::Desc)];
        s.source = vec!["name".to_string()];
        s.id = Some("ignored".to_string());
        s.body = Some(BodyOverride::Raw(json!({"ignored": true})));

        let doc = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap();
        let body = doc.body().unwrap();
        assert_eq!(body["from"], json!(0));
        assert_eq!(body["size"], json!(0));
        assert!(body.get("sort").is_none());
        assert!(body.get("_source").is_none());
        assert_eq!(
            body["aggs"]["groupby"]["aggs"]["grouplist"]["top_hits"],
            json!({
                "sort": [{"age": {"order": "desc"}}],
                "size": 3,
                "_source": {"includes": ["name"]}
            })
        );
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn test_collapse_with_group_by_is_flagged() {
        let mut s = spec("users");
        s.group_by = Some("city".to_string());
        s.collapse = Some("email".to_string());

        let err = DocumentAssembler::assemble(&s, &PredicateSet::new()).unwrap_err();
        assert!(matches!(err, BuilderError::ConflictingModes { .. }));
    }

    #[test]
    fn test_document_serializes_type_key() {
        let doc = DocumentAssembler::assemble(&spec("users"), &PredicateSet::new()).unwrap();
        let serialized = serde_json::to_value(&doc).unwrap();
        assert_eq!(serialized, doc.to_value());
    }
}
