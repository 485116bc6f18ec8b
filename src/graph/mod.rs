//! Core graph data structures

mod canonical;
mod edge;
mod node;
mod roadmap;
mod source;
mod value;

#[cfg(test)]
mod tests;

pub use canonical::{CanonicalEdge, CanonicalGraph, CanonicalNode};
pub use edge::{EdgeId, EdgeRecord};
pub use node::{ElementId, NodeRecord};
pub use roadmap::{RoadmapGraph, RoadmapNode, RoadmapRoute};
pub use source::{Provenance, SourceDataset, SourceTag};
pub use value::{attributes_agree, AttributeValue, Attributes};
