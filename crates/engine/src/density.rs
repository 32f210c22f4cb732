//! Dependency density counting.
//!
//! Counts how many distinct tasks a given task transitively depends on,
//! and how many of those are external (absent from the graph). The
//! traversal is an explicit work-list walk with a visited set: a cycle
//! only ever reintroduces an already-visited id, which is discarded, so
//! arbitrary cyclic graphs terminate in O(V + E) with no recursion.

use coopval_core::{DependencyGraph, TaskId};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Result of a dependency density count for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DependencyDensity {
    /// Distinct tasks reachable via one-or-more dependency edges,
    /// excluding the start task itself (a direct self-edge counts once)
    pub total: usize,
    /// Subset of `total` not present as graph members
    pub external: usize,
}

impl DependencyDensity {
    /// Fraction of reachable dependencies that are external, in [0, 1].
    pub fn external_ratio(&self) -> f64 {
        self.external as f64 / self.total.max(1) as f64
    }
}

/// Collect every distinct task id reachable from `start` via dependency
/// edges, excluding the start itself. A direct self-edge is the one case
/// where a task counts as its own dependency; merely being reachable
/// through a longer cycle does not put the start in its own count.
///
/// External ids (not graph members) are collected but never expanded:
/// untracked tasks have no known dependencies.
pub fn reachable_dependencies(graph: &DependencyGraph, start: &TaskId) -> HashSet<TaskId> {
    let direct = graph.dependencies_of(start);
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut frontier: VecDeque<TaskId> = direct.iter().cloned().collect();

    while let Some(id) = frontier.pop_front() {
        // The visited check is the sole cycle guard: a cycle re-delivers
        // an id that is already here and gets skipped.
        if !visited.insert(id.clone()) {
            continue;
        }
        for dep in graph.dependencies_of(&id) {
            if !visited.contains(dep) {
                frontier.push_back(dep.clone());
            }
        }
    }

    if !direct.contains(start) {
        visited.remove(start);
    }

    visited
}

/// Count a task's distinct transitive dependencies and how many of them
/// resolve to external (untracked) tasks.
pub fn count_dependencies(graph: &DependencyGraph, start: &TaskId) -> DependencyDensity {
    let reachable = reachable_dependencies(graph, start);
    let external = reachable.iter().filter(|id| !graph.contains(id)).count();
    let density = DependencyDensity {
        total: reachable.len(),
        external,
    };

    debug!(
        task = %start,
        total = density.total,
        external = density.external,
        "counted dependency density"
    );
    density
}
