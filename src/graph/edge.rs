//! Edge representation in a source dataset

use super::node::ElementId;
use super::value::{AttributeValue, Attributes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an edge: `(source, target, key)`.
///
/// `key` disambiguates parallel edges between the same endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    pub source: ElementId,
    pub target: ElementId,
    pub key: ElementId,
}

impl EdgeId {
    pub fn new(
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        key: impl Into<ElementId>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.source, self.target, self.key)
    }
}

/// A directed edge as delivered by one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    /// Role label (e.g. "visit", "participant"); `None` until resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub attributes: Attributes,
}

impl EdgeRecord {
    pub fn new(
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        key: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: EdgeId::new(source, target, key),
            role: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> &ElementId {
        &self.id.source
    }

    pub fn target(&self) -> &ElementId {
        &self.id.target
    }

    /// The complete attribute map as compared across sources, `role` included.
    pub fn comparable(&self) -> Attributes {
        let mut all = self.attributes.clone();
        if let Some(r) = &self.role {
            all.insert("role".to_string(), AttributeValue::String(r.clone()));
        }
        all
    }
}
