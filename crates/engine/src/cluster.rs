//! Cluster surplus pooling.
//!
//! Aggregates a group of tasks into a single cooperative surplus pool:
//! dependencies between members raise the pool via a synergy bonus, while
//! the cluster's combined dependency exposure is discounted through the
//! engine's risk model. Uncertainty bounds are summed into a pool-level
//! confidence interval; no simulation happens within the bounds.

use crate::density::{reachable_dependencies, DependencyDensity};
use crate::error::EngineError;
use crate::risk::RiskModel;
use crate::surplus::SurplusEngine;
use coopval_core::{ClusterId, DependencyGraph, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Configuration for cluster pooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// How strongly internal dependency edges raise the pool value
    pub synergy_multiplier: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            synergy_multiplier: 0.2,
        }
    }
}

/// Collective surplus for a cluster of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusPool {
    /// The evaluated cluster
    pub cluster_id: ClusterId,
    /// Member tasks, in request order
    pub task_ids: Vec<TaskId>,
    /// Discounted, synergy-adjusted pool value
    pub total_surplus: f64,
    /// Sum of member magnitudes per outcome category
    pub aggregated_magnitudes: HashMap<String, f64>,
    /// Weight-scaled sum of member uncertainty bounds
    pub confidence_interval: (f64, f64),
    /// Distinct dependency edges between cluster members
    pub internal_dependencies: usize,
    /// Distinct reachable dependencies resolving outside the graph
    pub external_dependencies: usize,
    /// Multiplier applied for internal synergy (>= 1.0)
    pub synergy_bonus: f64,
    /// Risk discount applied to the pool, in (0, 1]
    pub risk_discount: f64,
}

impl SurplusEngine {
    /// Compute the collective surplus pool for a cluster of tasks.
    ///
    /// Every member id must be present in the graph; a missing member is
    /// an [`EngineError::UnknownTask`] because it changes the collective
    /// result, unlike batch mode where tasks are independent.
    pub fn evaluate_cluster(
        &self,
        graph: &DependencyGraph,
        cluster_id: ClusterId,
        member_ids: &[TaskId],
        config: ClusterConfig,
    ) -> Result<SurplusPool, EngineError> {
        if member_ids.is_empty() {
            return Ok(SurplusPool {
                cluster_id,
                task_ids: Vec::new(),
                total_surplus: 0.0,
                aggregated_magnitudes: HashMap::new(),
                confidence_interval: (0.0, 0.0),
                internal_dependencies: 0,
                external_dependencies: 0,
                synergy_bonus: 1.0,
                risk_discount: 1.0,
            });
        }

        let members: HashSet<&TaskId> = member_ids.iter().collect();

        let mut raw_total = 0.0;
        let mut aggregated_magnitudes: HashMap<String, f64> = HashMap::new();
        let mut ci_low = 0.0;
        let mut ci_high = 0.0;
        let mut internal_edges: HashSet<(&TaskId, &TaskId)> = HashSet::new();
        let mut reach_union: HashSet<TaskId> = HashSet::new();

        for member in member_ids {
            let vector = graph
                .get(member)
                .ok_or_else(|| EngineError::UnknownTask(member.clone()))?;

            let weight = vector.weight_for_category();
            raw_total += vector.magnitude_projection * weight;
            ci_low += vector.uncertainty_bounds.low * weight;
            ci_high += vector.uncertainty_bounds.high * weight;
            *aggregated_magnitudes
                .entry(vector.outcome_category.as_str().to_string())
                .or_insert(0.0) += vector.magnitude_projection;

            for dep in &vector.causal_dependencies {
                if dep != member && members.contains(dep) {
                    internal_edges.insert((member, dep));
                }
            }

            reach_union.extend(reachable_dependencies(graph, member));
        }

        let external: HashSet<&TaskId> = reach_union
            .iter()
            .filter(|id| !graph.contains(id))
            .collect();
        let density = DependencyDensity {
            total: reach_union.len(),
            external: external.len(),
        };

        // Synergy scales with how densely members depend on each other,
        // relative to the n(n-1) possible internal edges.
        let n = member_ids.len();
        let synergy_density = if n > 1 {
            internal_edges.len() as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        let synergy_bonus = 1.0
            + (internal_edges.len() as f64 * config.synergy_multiplier) * (1.0 + synergy_density);

        let risk_discount =
            RiskModel::discount(self.model(), density, self.config().dependency_risk_factor());
        let total_surplus = raw_total * synergy_bonus * risk_discount;

        debug!(
            cluster = %cluster_id,
            members = n,
            internal = internal_edges.len(),
            external = density.external,
            synergy_bonus,
            risk_discount,
            total_surplus,
            "evaluated cluster surplus"
        );

        Ok(SurplusPool {
            cluster_id,
            task_ids: member_ids.to_vec(),
            total_surplus,
            aggregated_magnitudes,
            confidence_interval: (ci_low, ci_high),
            internal_dependencies: internal_edges.len(),
            external_dependencies: density.external,
            synergy_bonus,
            risk_discount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskConfig;
    use coopval_core::{ImpactVector, OutcomeCategory, UncertaintyBounds};

    fn vector(category: OutcomeCategory, magnitude: f64, deps: &[&str]) -> ImpactVector {
        ImpactVector::new(
            category,
            magnitude,
            30.0,
            UncertaintyBounds::new(magnitude - 1.0, magnitude + 1.0),
        )
        .with_dependencies(deps.iter().map(|d| TaskId::from(*d)))
    }

    fn engine(factor: f64) -> SurplusEngine {
        SurplusEngine::new(RiskConfig::new(factor).unwrap())
    }

    #[test]
    fn test_empty_cluster() {
        let graph = DependencyGraph::new();
        let pool = engine(0.1)
            .evaluate_cluster(&graph, ClusterId::from("c0"), &[], ClusterConfig::default())
            .unwrap();

        assert_eq!(pool.total_surplus, 0.0);
        assert!(pool.task_ids.is_empty());
        assert_eq!(pool.risk_discount, 1.0);
        assert_eq!(pool.synergy_bonus, 1.0);
    }

    #[test]
    fn test_single_task_no_deps() {
        let graph = DependencyGraph::from_vectors([(
            TaskId::from("t1"),
            vector(OutcomeCategory::Technical, 10.0, &[]),
        )])
        .unwrap();

        let pool = engine(0.1)
            .evaluate_cluster(
                &graph,
                ClusterId::from("c1"),
                &[TaskId::from("t1")],
                ClusterConfig::default(),
            )
            .unwrap();

        assert_eq!(pool.total_surplus, 10.0);
        assert_eq!(pool.synergy_bonus, 1.0);
        assert_eq!(pool.risk_discount, 1.0);
        assert_eq!(pool.aggregated_magnitudes["technical"], 10.0);
        assert_eq!(pool.confidence_interval, (9.0, 11.0));
    }

    #[test]
    fn test_internal_dependency_raises_pool() {
        let base = DependencyGraph::from_vectors([
            (TaskId::from("t1"), vector(OutcomeCategory::Technical, 10.0, &[])),
            (TaskId::from("t2"), vector(OutcomeCategory::Efficiency, 5.0, &[])),
        ])
        .unwrap();
        let linked = DependencyGraph::from_vectors([
            (TaskId::from("t1"), vector(OutcomeCategory::Technical, 10.0, &[])),
            (TaskId::from("t2"), vector(OutcomeCategory::Efficiency, 5.0, &["t1"])),
        ])
        .unwrap();

        let members = [TaskId::from("t1"), TaskId::from("t2")];
        // Zero risk factor isolates the synergy effect
        let flat = engine(0.0)
            .evaluate_cluster(&base, ClusterId::from("c"), &members, ClusterConfig::default())
            .unwrap();
        let synergetic = engine(0.0)
            .evaluate_cluster(&linked, ClusterId::from("c"), &members, ClusterConfig::default())
            .unwrap();

        assert_eq!(flat.internal_dependencies, 0);
        assert_eq!(synergetic.internal_dependencies, 1);
        assert!(synergetic.synergy_bonus > 1.0);
        assert!(synergetic.total_surplus > flat.total_surplus);
    }

    #[test]
    fn test_external_dependency_discounts_pool() {
        let graph = DependencyGraph::from_vectors([
            (TaskId::from("t1"), vector(OutcomeCategory::Technical, 10.0, &[])),
            (TaskId::from("t2"), vector(OutcomeCategory::Revenue, 20.0, &["ext-001"])),
        ])
        .unwrap();

        let members = [TaskId::from("t1"), TaskId::from("t2")];
        let pool = engine(0.5)
            .evaluate_cluster(&graph, ClusterId::from("c"), &members, ClusterConfig::default())
            .unwrap();

        assert_eq!(pool.external_dependencies, 1);
        assert!(pool.risk_discount < 1.0);
        assert!(pool.total_surplus < 30.0);
    }

    #[test]
    fn test_unknown_member_is_an_error() {
        let graph = DependencyGraph::from_vectors([(
            TaskId::from("t1"),
            vector(OutcomeCategory::Technical, 10.0, &[]),
        )])
        .unwrap();

        let err = engine(0.1)
            .evaluate_cluster(
                &graph,
                ClusterId::from("c"),
                &[TaskId::from("t1"), TaskId::from("ghost")],
                ClusterConfig::default(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownTask(TaskId::from("ghost")));
    }

    #[test]
    fn test_cyclic_cluster_completes() {
        // A -> B -> C -> A: internal edges only, bounded traversal
        let graph = DependencyGraph::from_vectors([
            (TaskId::from("a"), vector(OutcomeCategory::Technical, 1.0, &["b"])),
            (TaskId::from("b"), vector(OutcomeCategory::Technical, 1.0, &["c"])),
            (TaskId::from("c"), vector(OutcomeCategory::Technical, 1.0, &["a"])),
        ])
        .unwrap();

        let members = [TaskId::from("a"), TaskId::from("b"), TaskId::from("c")];
        let pool = engine(0.1)
            .evaluate_cluster(&graph, ClusterId::from("ring"), &members, ClusterConfig::default())
            .unwrap();

        assert_eq!(pool.internal_dependencies, 3);
        assert_eq!(pool.external_dependencies, 0);
        assert!(pool.synergy_bonus > 1.0);
    }
}
