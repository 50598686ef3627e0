//! Raw response → records
use super::{Group, Record, Records, ResultSet};
use serde_json::{json, Value};

/// Response reshaper
pub struct ResponseReshaper;

impl ResponseReshaper {
    /// Reshape a search response
    ///
    /// Grouped buckets win over plain hits; a distinct count wins over the
    /// plain hit total.
    pub fn reshape(mut raw: Value, merge_source: bool) -> ResultSet {
        let buckets = raw.pointer_mut("/aggregations/groupby/buckets").map(Value::take);
        if let Some(Value::Array(buckets)) = buckets {
            let total = buckets.len() as u64;
            let groups = Self::groups(buckets, merge_source);
            tracing::trace!("Reshaped {} groups", groups.len());
            return ResultSet {
                total,
                records: Records::Groups(groups),
            };
        }

        let total = Self::total(&raw);
        let hits: Vec<Record> = match raw.pointer_mut("/hits/hits").map(Value::take) {
            Some(Value::Array(hits)) => hits
                .into_iter()
                .filter_map(|hit| match hit {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .map(|record| {
                    if merge_source {
                        Self::merge_source(record)
                    } else {
                        record
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        ResultSet {
            total,
            records: Records::Hits(hits),
        }
    }

    /// Total of a non-grouped response: distinct count, else hit total
    pub fn total(raw: &Value) -> u64 {
        raw.pointer("/aggregations/count/value")
            .and_then(Self::count)
            .or_else(|| raw.pointer("/hits/total").and_then(Self::count))
            .unwrap_or(0)
    }

    /// Reshape a single-document fetch; `None` when the engine reports it missing
    pub fn document(raw: Value, merge_source: bool) -> Option<Record> {
        if raw.get("found") == Some(&Value::Bool(false)) {
            return None;
        }

        match raw {
            Value::Object(record) if merge_source => Some(Self::merge_source(record)),
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Lift `_source` fields into the hit and drop the container
    pub fn merge_source(mut hit: Record) -> Record {
        match hit.remove("_source") {
            Some(Value::Object(source)) => {
                for (key, value) in source {
                    hit.insert(key, value);
                }
            }
            Some(other) => {
                hit.insert("_source".to_string(), other);
            }
            None => {}
        }
        hit
    }

    fn groups(buckets: Vec<Value>, merge_source: bool) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();

        for mut bucket in buckets {
            let key = bucket.get("key").map(Self::key_string).unwrap_or_default();
            let doc_count = bucket.get("doc_count").and_then(Self::count).unwrap_or(0);

            let hits = match bucket.pointer_mut("/grouplist/hits/hits").map(Value::take) {
                Some(Value::Array(hits)) => hits,
                _ => Vec::new(),
            };

            let records = hits.into_iter().filter_map(|hit| match hit {
                Value::Object(record) => {
                    let mut record = if merge_source {
                        Self::merge_source(record)
                    } else {
                        record
                    };
                    if record.get("total").map_or(true, Value::is_null) {
                        record.insert("total".to_string(), json!(doc_count));
                    }
                    Some(record)
                }
                _ => None,
            });

            match groups.iter_mut().find(|group| group.key == key) {
                Some(group) => group.records.extend(records),
                None => groups.push(Group {
                    key,
                    doc_count,
                    records: records.collect(),
                }),
            }
        }

        groups
    }

    /// Count as a plain number or as `{"value": n}`
    fn count(value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::Object(map) => map.get("value").and_then(Self::count),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn key_string(key: &Value) -> String {
        match key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_response() -> Value {
        json!({
            "took": 3,
            "hits": {
                "total": 2,
                "hits": [
                    {"_id": "1", "_score": 1.0, "_source": {"name": "alice", "age": 30}},
                    {"_id": "2", "_score": 0.5, "_source": {"name": "bob", "age": 25}}
                ]
            }
        })
    }

    #[test]
    fn test_flat_hits_merge_source() {
        let result = ResponseReshaper::reshape(search_response(), true);

        assert_eq!(result.total, 2);
        let records = result.records.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], json!("alice"));
        assert_eq!(records[0]["_id"], json!("1"));
        assert!(!records[0].contains_key("_source"));
    }

    #[test]
    fn test_flat_hits_keep_source_when_disabled() {
        let result = ResponseReshaper::reshape(search_response(), false);
        let first = result.records.first().unwrap();
        assert_eq!(first["_source"]["name"], json!("alice"));
        assert!(!first.contains_key("name"));
    }

    #[test]
    fn test_distinct_count_wins_over_hit_total() {
        let raw = json!({
            "hits": {"total": {"value": 120, "relation": "eq"}, "hits": []},
            "aggregations": {"count": {"value": 17}}
        });
        assert_eq!(ResponseReshaper::total(&raw), 17);
        assert_eq!(ResponseReshaper::reshape(raw, true).total, 17);
    }

    #[test]
    fn test_object_hit_total() {
        let raw = json!({"hits": {"total": {"value": 42, "relation": "gte"}, "hits": []}});
        assert_eq!(ResponseReshaper::total(&raw), 42);
    }

    #[test]
    fn test_missing_paths_give_empty_result() {
        let result = ResponseReshaper::reshape(json!({}), true);
        assert_eq!(result.total, 0);
        assert!(result.records.is_empty());
        assert!(!result.records.is_grouped());
    }

    #[test]
    fn test_grouped_buckets() {
        let raw = json!({
            "hits": {"total": 9, "hits": []},
            "aggregations": {"groupby": {"buckets": [
                {"key": "rome", "doc_count": 5, "grouplist": {"hits": {"hits": [
                    {"_id": "1", "_source": {"name": "alice"}},
                    {"_id": "2", "_source": {"name": "carl", "total": 99}}
                ]}}},
                {"key": 2024, "doc_count": 4, "grouplist": {"hits": {"hits": [
                    {"_id": "3", "_source": {"name": "bob"}}
                ]}}}
            ]}}
        });

        let result = ResponseReshaper::reshape(raw, true);
        assert_eq!(result.total, 2);
        assert!(result.records.is_grouped());

        let rome = result.records.group("rome").unwrap();
        assert_eq!(rome.len(), 2);
        assert_eq!(rome[0]["name"], json!("alice"));
        assert_eq!(rome[0]["total"], json!(5));
        assert_eq!(rome[1]["total"], json!(99));

        let year = result.records.group("2024").unwrap();
        assert_eq!(year[0]["total"], json!(4));
        assert_eq!(result.records.first().unwrap()["_id"], json!("1"));
    }

    #[test]
    fn test_grouped_without_merge_keeps_source() {
        let raw = json!({"aggregations": {"groupby": {"buckets": [
            {"key": "rome", "doc_count": 1, "grouplist": {"hits": {"hits": [
                {"_id": "1", "_source": {"name": "alice"}}
            ]}}}
        ]}}});

        let result = ResponseReshaper::reshape(raw, false);
        let rome = result.records.group("rome").unwrap();
        assert_eq!(rome[0]["_source"], json!({"name": "alice"}));
        assert_eq!(rome[0]["total"], json!(1));
    }

    #[test]
    fn test_document_fetch() {
        let raw = json!({
            "_index": "users",
            "_id": "1",
            "found": true,
            "_source": {"name": "alice"}
        });
        let record = ResponseReshaper::document(raw, true).unwrap();
        assert_eq!(record["name"], json!("alice"));
        assert_eq!(record["found"], json!(true));

        let missing = json!({"_index": "users", "_id": "9", "found": false});
        assert_eq!(ResponseReshaper::document(missing, true), None);
    }
}
