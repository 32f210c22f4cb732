//! Causal dependency graph over tasks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::TaskId;
use crate::impact::{ImpactVector, ValidationError};

/// Error type for graph ingestion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// The vector for a task failed structural validation
    #[error("invalid impact vector for task '{task_id}': {source}")]
    InvalidImpactVector {
        /// Task the rejected vector was submitted for
        task_id: TaskId,
        /// Underlying validation failure
        source: ValidationError,
    },
}

/// A directed graph mapping each task to its Impact Vector, and through
/// the vector's `causal_dependencies` to its outgoing dependency edges.
///
/// The graph is **not** required to be acyclic: cycles and self-loops are
/// valid input and the traversal layer handles them structurally. Edges
/// may also name tasks that were never inserted; such ids are external
/// dependencies and act as terminal leaves.
///
/// Vectors are validated on insertion so that downstream computation can
/// assume well-formed input. The engine never mutates a graph; callers
/// needing read-consistent batch evaluation share it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "HashMap<TaskId, ImpactVector>", into = "HashMap<TaskId, ImpactVector>")]
pub struct DependencyGraph {
    tasks: HashMap<TaskId, ImpactVector>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task's Impact Vector, validating it first.
    ///
    /// Replaces any previous vector for the same id. Dependency edges are
    /// not checked against graph membership here: edges to absent ids are
    /// a valid shape (external dependencies), and the referenced task may
    /// simply not have been submitted yet.
    pub fn insert(&mut self, task_id: TaskId, vector: ImpactVector) -> Result<(), GraphError> {
        vector
            .validate()
            .map_err(|source| GraphError::InvalidImpactVector {
                task_id: task_id.clone(),
                source,
            })?;
        self.tasks.insert(task_id, vector);
        Ok(())
    }

    /// Build a graph from (id, vector) pairs, validating each.
    pub fn from_vectors(
        vectors: impl IntoIterator<Item = (TaskId, ImpactVector)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for (task_id, vector) in vectors {
            graph.insert(task_id, vector)?;
        }
        Ok(graph)
    }

    /// Look up a task's Impact Vector.
    pub fn get(&self, task_id: &TaskId) -> Option<&ImpactVector> {
        self.tasks.get(task_id)
    }

    /// Whether the id is a tracked member of the graph.
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.tasks.contains_key(task_id)
    }

    /// Direct dependency edges of a task; empty if the id is untracked
    /// (untracked tasks have no known dependencies).
    pub fn dependencies_of(&self, task_id: &TaskId) -> &[TaskId] {
        self.tasks
            .get(task_id)
            .map(|v| v.causal_dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all (id, vector) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &ImpactVector)> {
        self.tasks.iter()
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph has no tracked tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TryFrom<HashMap<TaskId, ImpactVector>> for DependencyGraph {
    type Error = GraphError;

    fn try_from(tasks: HashMap<TaskId, ImpactVector>) -> Result<Self, Self::Error> {
        Self::from_vectors(tasks)
    }
}

impl From<DependencyGraph> for HashMap<TaskId, ImpactVector> {
    fn from(graph: DependencyGraph) -> Self {
        graph.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::{OutcomeCategory, UncertaintyBounds};

    fn vector(deps: &[&str]) -> ImpactVector {
        ImpactVector::new(
            OutcomeCategory::Technical,
            10.0,
            30.0,
            UncertaintyBounds::new(9.0, 11.0),
        )
        .with_dependencies(deps.iter().map(|d| TaskId::from(*d)))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut graph = DependencyGraph::new();
        graph.insert(TaskId::from("a"), vector(&["b", "x"])).unwrap();

        assert!(graph.contains(&TaskId::from("a")));
        assert!(!graph.contains(&TaskId::from("b")));
        assert_eq!(
            graph.dependencies_of(&TaskId::from("a")),
            &[TaskId::from("b"), TaskId::from("x")]
        );
        // Untracked ids have no known dependencies
        assert!(graph.dependencies_of(&TaskId::from("x")).is_empty());
    }

    #[test]
    fn test_insert_rejects_invalid_vector() {
        let mut bad = vector(&[]);
        bad.magnitude_projection = 100.0; // outside (9, 11)

        let mut graph = DependencyGraph::new();
        let err = graph.insert(TaskId::from("a"), bad).unwrap_err();
        assert!(matches!(err, GraphError::InvalidImpactVector { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_cyclic_edges_are_accepted() {
        // A -> B -> A and a self-loop are valid graph shapes
        let graph = DependencyGraph::from_vectors([
            (TaskId::from("a"), vector(&["b"])),
            (TaskId::from("b"), vector(&["a"])),
            (TaskId::from("c"), vector(&["c"])),
        ])
        .unwrap();
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_deserialize_validates_vectors() {
        let json = r#"{
            "a": {
                "outcome_category": "technical",
                "magnitude_projection": 100.0,
                "time_horizon": 30.0,
                "uncertainty_bounds": { "low": 0.0, "high": 10.0 }
            }
        }"#;
        // magnitude outside bounds: ingestion must reject, not defer
        assert!(serde_json::from_str::<DependencyGraph>(json).is_err());
    }
}
