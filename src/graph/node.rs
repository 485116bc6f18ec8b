//! Node representation in a source dataset

use super::value::{AttributeValue, Attributes};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of a node, unique within its source.
///
/// Source documents use both strings and integers as identifiers; the two are
/// kept distinct (`5` and `"5"` are different nodes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Int(i64),
    Str(String),
}

impl ElementId {
    /// Read an identifier from raw JSON. Only integers and strings qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Read an edge key. A string holding the canonical rendering of an
    /// integer is read as that integer, so `"0"` and `0` key the same edge.
    pub fn key_from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.parse::<i64>() {
                Ok(i) if i.to_string() == *s => Some(Self::Int(i)),
                _ => Some(Self::Str(s.clone())),
            },
            other => Self::from_json(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for ElementId {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ElementId {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

/// A node as delivered by one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: ElementId,
    /// Type label (e.g. "place", "entity.person"); `None` until resolved
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub attributes: Attributes,
}

impl NodeRecord {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            node_type: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// The complete attribute map as compared across sources, `type` included.
    pub fn comparable(&self) -> Attributes {
        let mut all = self.attributes.clone();
        if let Some(t) = &self.node_type {
            all.insert("type".to_string(), AttributeValue::String(t.clone()));
        }
        all
    }
}
