//! Response reshaping
//!
//! Interprets the few paths of a raw search response the builder cares
//! about (`hits.total`, `hits.hits`, `aggregations.count.value`,
//! `aggregations.groupby.buckets`) and turns them into flat records or
//! keyed groups.

mod reshaper;

pub use reshaper::ResponseReshaper;

use serde::Serialize;
use serde_json::{Map, Value};

/// One hit, optionally with its `_source` fields merged in
pub type Record = Map<String, Value>;

/// Records sharing one group-by bucket key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    /// Bucket key, rendered as a string
    pub key: String,
    /// Documents in the bucket, as reported by the engine
    pub doc_count: u64,
    pub records: Vec<Record>,
}

/// Reshaped hits: a flat list, or groups in bucket order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Hits(Vec<Record>),
    Groups(Vec<Group>),
}

impl Records {
    pub fn is_grouped(&self) -> bool {
        matches!(self, Records::Groups(_))
    }

    /// Number of hits, or number of groups
    pub fn len(&self) -> usize {
        match self {
            Records::Hits(hits) => hits.len(),
            Records::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Head record; for groups, the first record of the first group
    pub fn first(&self) -> Option<&Record> {
        match self {
            Records::Hits(hits) => hits.first(),
            Records::Groups(groups) => groups.iter().flat_map(|group| group.records.iter()).next(),
        }
    }

    /// Records of one group
    pub fn group(&self, key: &str) -> Option<&[Record]> {
        match self {
            Records::Hits(_) => None,
            Records::Groups(groups) => groups
                .iter()
                .find(|group| group.key == key)
                .map(|group| group.records.as_slice()),
        }
    }

    /// All records in order, groups flattened
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Records::Hits(hits) => hits,
            Records::Groups(groups) => groups.into_iter().flat_map(|group| group.records).collect(),
        }
    }
}

/// Total plus reshaped records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub total: u64,
    pub records: Records,
}
