//! Structural query options
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    /// Parse `asc` / `desc`, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(field, direction)` sort pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Caller-supplied replacement for the generated body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOverride {
    /// Literal body sent as-is
    Raw(Value),
    /// Send no body (id-only operations)
    Suppress,
}

impl BodyOverride {
    /// Interpret a loosely typed body value
    ///
    /// Non-empty objects and arrays become [`BodyOverride::Raw`]; any other
    /// truthy value is a presence marker and suppresses the body. Null,
    /// `false`, zero and empty values clear the override.
    pub fn from_value(value: Value) -> Option<Self> {
        let structured = match &value {
            Value::Object(map) => Some(!map.is_empty()),
            Value::Array(items) => Some(!items.is_empty()),
            _ => None,
        };
        if let Some(non_empty) = structured {
            return non_empty.then_some(BodyOverride::Raw(value));
        }

        let truthy = match &value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty() && s != "0",
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::Object(_) | Value::Array(_) => true,
        };
        truthy.then_some(BodyOverride::Suppress)
    }
}

/// Everything besides predicates that shapes a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub index: String,
    pub doc_type: String,
    pub id: Option<String>,
    pub offset: u64,
    /// Page size; zero means unset
    pub size: u64,
    pub sort: Vec<SortOrder>,
    pub source: Vec<String>,
    pub collapse: Option<String>,
    pub group_by: Option<String>,
    pub body: Option<BodyOverride>,
}

impl QuerySpec {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            ..Default::default()
        }
    }

    /// Group-by emulation is active
    pub fn is_grouped(&self) -> bool {
        self.group_by.is_some()
    }
}
