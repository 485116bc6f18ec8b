//! Data tables driving label inference

use crate::graph::ElementId;
use serde::{Deserialize, Serialize};

/// One known-missing node type.
///
/// `position` indexes the nodes of the corrected source that still lack a
/// type after structural inference, in record order. `id` is the identity
/// expected at that position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCorrection {
    pub position: usize,
    pub id: ElementId,
    #[serde(rename = "type")]
    pub node_type: String,
}

impl TypeCorrection {
    pub fn new(position: usize, id: impl Into<ElementId>, node_type: impl Into<String>) -> Self {
        Self {
            position,
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionTable(Vec<TypeCorrection>);

impl CorrectionTable {
    pub fn new(entries: Vec<TypeCorrection>) -> Self {
        Self(entries)
    }

    /// Corrections for the journalist dataset as delivered
    pub fn builtin() -> Self {
        Self(vec![
            TypeCorrection::new(0, "Bay Harvest Corporation", "entity.organization"),
            TypeCorrection::new(1, "name_harbor_area_Meeting_11_Harbor_Odyssey_Tours", "plan"),
            TypeCorrection::new(2, "Harbor Odyssey Tours", "entity.organization"),
            TypeCorrection::new(3, 10803677425_i64, "place"),
            TypeCorrection::new(4, "Sean", "entity.person"),
            TypeCorrection::new(5, "concert_Travel_Harborfront_Market", "plan"),
        ])
    }

    pub fn entries(&self) -> &[TypeCorrection] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Role implied by the types of an edge's endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub source_type: String,
    pub target_type: String,
    pub role: String,
}

impl RoleRule {
    pub fn new(
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            target_type: target_type.into(),
            role: role.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRules(Vec<RoleRule>);

impl RoleRules {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self(rules)
    }

    pub fn builtin() -> Self {
        Self(vec![
            RoleRule::new("trip", "place", "visit"),
            RoleRule::new("trip", "entity.person", "took"),
        ])
    }

    /// First matching role for a `(source type, target type)` combination.
    ///
    /// Returns `None` when either type is unknown or no rule matches.
    pub fn evaluate(&self, source_type: Option<&str>, target_type: Option<&str>) -> Option<&str> {
        let (source_type, target_type) = (source_type?, target_type?);
        self.0
            .iter()
            .find(|r| r.source_type == source_type && r.target_type == target_type)
            .map(|r| r.role.as_str())
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.0
    }
}
