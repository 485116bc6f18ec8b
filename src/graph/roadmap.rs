//! Auxiliary road network, kept apart from provenance merging

use super::node::ElementId;
use super::value::Attributes;
use serde::{Deserialize, Serialize};

/// A place-like node of the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapNode {
    /// Shares the identity domain of canonical place nodes
    pub id: ElementId,
    pub attributes: Attributes,
}

impl RoadmapNode {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }
}

/// An undirected, keyed route between two roadmap nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapRoute {
    pub source: ElementId,
    pub target: ElementId,
    pub key: ElementId,
}

impl RoadmapRoute {
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

    /// Endpoints in a direction-independent order
    pub fn endpoints(&self) -> (&ElementId, &ElementId) {
        if self.source <= self.target {
            (&self.source, &self.target)
        } else {
            (&self.target, &self.source)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadmapGraph {
    pub nodes: Vec<RoadmapNode>,
    pub routes: Vec<RoadmapRoute>,
}

impl RoadmapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: RoadmapNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_route(mut self, route: RoadmapRoute) -> Self {
        self.routes.push(route);
        self
    }
}
