//! Attribute repair and label inference
//!
//! Three ordered passes fill in missing node types and edge roles. Each pass
//! only touches elements that are still unlabeled after the previous one:
//!
//! 1. structural: a node with a coordinate attribute is a place
//! 2. table-driven corrections for known-missing node types
//! 3. edge roles from the types of their endpoints
//!
//! Anything still unlabeled afterwards is left for persistence to reject.

mod rules;

pub use rules::{CorrectionTable, RoleRule, RoleRules, TypeCorrection};

use crate::graph::{ElementId, SourceDataset, SourceTag};
use serde::Serialize;
use thiserror::Error;

/// Type assigned by structural inference
pub const PLACE_TYPE: &str = "place";

#[derive(Debug, Error)]
pub enum RepairError {
    #[error(
        "Correction table drifted from {dataset} data: expected {expected} at position {position}, found {}",
        describe(.found)
    )]
    CorrectionDrift {
        dataset: SourceTag,
        position: usize,
        expected: ElementId,
        found: Option<ElementId>,
    },
}

fn describe(found: &Option<ElementId>) -> String {
    match found {
        Some(id) => id.to_string(),
        None => "nothing".to_string(),
    }
}

/// What the passes changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub inferred_places: usize,
    pub corrected_types: usize,
    pub inferred_roles: usize,
    /// Edges whose role is still unknown after all passes
    pub unresolved_edges: usize,
}

#[derive(Debug, Clone)]
pub struct Repairer {
    coordinate_key: String,
    correction_source: SourceTag,
    corrections: CorrectionTable,
    role_rules: RoleRules,
}

impl Default for Repairer {
    fn default() -> Self {
        Self {
            coordinate_key: "lat".to_string(),
            correction_source: SourceTag::Journalist,
            corrections: CorrectionTable::builtin(),
            role_rules: RoleRules::builtin(),
        }
    }
}

impl Repairer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coordinate_key(mut self, key: impl Into<String>) -> Self {
        self.coordinate_key = key.into();
        self
    }

    pub fn with_corrections(mut self, source: SourceTag, corrections: CorrectionTable) -> Self {
        self.correction_source = source;
        self.corrections = corrections;
        self
    }

    pub fn with_role_rules(mut self, rules: RoleRules) -> Self {
        self.role_rules = rules;
        self
    }

    /// Run all three passes over every dataset.
    pub fn repair(&self, datasets: &mut [SourceDataset]) -> Result<RepairReport, RepairError> {
        let mut report = RepairReport::default();

        for dataset in datasets.iter_mut() {
            report.inferred_places += self.infer_place_types(dataset);
        }

        match datasets.iter_mut().find(|d| d.tag == self.correction_source) {
            Some(dataset) => report.corrected_types += self.apply_corrections(dataset)?,
            None if !self.corrections.is_empty() => {
                tracing::debug!(source = %self.correction_source, "correction source not loaded, skipping corrections");
            }
            None => {}
        }

        for dataset in datasets.iter_mut() {
            let (inferred, unresolved) = self.infer_roles(dataset);
            report.inferred_roles += inferred;
            report.unresolved_edges += unresolved;
        }

        tracing::info!(
            places = report.inferred_places,
            corrected = report.corrected_types,
            roles = report.inferred_roles,
            unresolved = report.unresolved_edges,
            "repair passes complete"
        );
        Ok(report)
    }

    /// Pass 1: untyped nodes carrying the coordinate attribute become places.
    pub fn infer_place_types(&self, dataset: &mut SourceDataset) -> usize {
        let mut count = 0;
        for node in dataset.nodes.iter_mut() {
            if node.node_type.is_none() && node.has_attribute(&self.coordinate_key) {
                node.node_type = Some(PLACE_TYPE.to_string());
                count += 1;
            }
        }
        count
    }

    /// Pass 2: apply the correction table to the nodes still missing a type.
    ///
    /// Every entry is verified before any is applied, so a drifted table
    /// leaves the dataset untouched.
    pub fn apply_corrections(&self, dataset: &mut SourceDataset) -> Result<usize, RepairError> {
        let missing: Vec<usize> = dataset
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.node_type.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut targets = Vec::with_capacity(self.corrections.entries().len());
        for correction in self.corrections.entries() {
            let found = missing
                .get(correction.position)
                .map(|&i| &dataset.nodes[i].id);
            match found {
                Some(id) if *id == correction.id => {
                    targets.push((missing[correction.position], &correction.node_type));
                }
                _ => {
                    return Err(RepairError::CorrectionDrift {
                        dataset: dataset.tag,
                        position: correction.position,
                        expected: correction.id.clone(),
                        found: found.cloned(),
                    })
                }
            }
        }

        for (index, node_type) in &targets {
            let node = &mut dataset.nodes[*index];
            tracing::debug!(identity = %node.id, node_type = %node_type, "applying type correction");
            node.node_type = Some((*node_type).clone());
        }
        Ok(targets.len())
    }

    /// Pass 3: infer missing edge roles from endpoint types in the same source.
    ///
    /// Returns `(inferred, still_unresolved)`.
    pub fn infer_roles(&self, dataset: &mut SourceDataset) -> (usize, usize) {
        let types = dataset.node_types();
        let mut inferred = 0;
        let mut unresolved = 0;

        for edge in dataset.edges.iter_mut().filter(|e| e.role.is_none()) {
            let source_type = types.get(edge.source()).map(String::as_str);
            let target_type = types.get(edge.target()).map(String::as_str);
            match self.role_rules.evaluate(source_type, target_type) {
                Some(role) => {
                    edge.role = Some(role.to_string());
                    inferred += 1;
                }
                None => {
                    tracing::debug!(
                        source = %dataset.tag,
                        edge = %edge.id,
                        ?source_type,
                        ?target_type,
                        "no role rule matches"
                    );
                    unresolved += 1;
                }
            }
        }

        (inferred, unresolved)
    }
}
