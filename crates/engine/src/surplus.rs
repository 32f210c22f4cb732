//! The cooperative surplus engine.
//!
//! Orchestrates the density counter and risk model to produce a
//! discounted surplus value per task. Evaluation is a pure function of
//! (graph, task id, risk config): the graph is never mutated, so repeated
//! calls with unchanged input return identical results and batch workers
//! share the graph without locking.

use crate::density::{count_dependencies, DependencyDensity};
use crate::error::EngineError;
use crate::risk::{LogDampenedRisk, RiskConfig, RiskModel};
use coopval_core::{DependencyGraph, TaskId, Time};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Surplus computation for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusResult {
    /// The evaluated task
    pub task_id: TaskId,
    /// Magnitude scaled by the task's domain weight, before discounting
    pub raw_value: f64,
    /// Risk discount applied, in (0, 1]
    pub discount: f64,
    /// `raw_value * discount`
    pub discounted_value: f64,
    /// Distinct transitive dependencies counted
    pub dependency_count: usize,
    /// Dependencies that resolved to untracked tasks
    pub external_count: usize,
}

/// A failed task evaluation inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// The task that failed
    pub task_id: TaskId,
    /// Why it failed
    pub error: EngineError,
}

/// Outcome of a batch evaluation: per-task successes and failures.
///
/// One task's failure never aborts its siblings.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Results for tasks that evaluated successfully, in request order
    pub results: Vec<SurplusResult>,
    /// Tasks that could not be evaluated, in request order
    pub failures: Vec<BatchFailure>,
    /// When the batch completed
    pub evaluated_at: Time,
}

/// Computes risk-discounted surplus values over a dependency graph.
#[derive(Clone)]
pub struct SurplusEngine {
    config: RiskConfig,
    model: Arc<dyn RiskModel>,
}

impl SurplusEngine {
    /// Create an engine with the given risk configuration and the default
    /// log-dampened risk model.
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            model: Arc::new(LogDampenedRisk),
        }
    }

    /// Swap in a different risk model.
    pub fn with_model(mut self, model: Arc<dyn RiskModel>) -> Self {
        self.model = model;
        self
    }

    /// The engine's risk configuration.
    pub fn config(&self) -> RiskConfig {
        self.config
    }

    pub(crate) fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    /// Evaluate the discounted surplus for one task.
    pub fn evaluate(
        &self,
        graph: &DependencyGraph,
        task_id: &TaskId,
    ) -> Result<SurplusResult, EngineError> {
        let vector = graph
            .get(task_id)
            .ok_or_else(|| EngineError::UnknownTask(task_id.clone()))?;

        let raw_value = vector.magnitude_projection * vector.weight_for_category();
        let density = count_dependencies(graph, task_id);
        let discount = self
            .model
            .discount(density, self.config.dependency_risk_factor());
        let discounted_value = raw_value * discount;

        debug!(
            task = %task_id,
            raw_value,
            discount,
            discounted_value,
            "evaluated surplus"
        );

        Ok(SurplusResult {
            task_id: task_id.clone(),
            raw_value,
            discount,
            discounted_value,
            dependency_count: density.total,
            external_count: density.external,
        })
    }

    /// Evaluate the dependency density for one task without valuing it.
    ///
    /// Exposed so callers can audit the counts behind a discount.
    pub fn density(
        &self,
        graph: &DependencyGraph,
        task_id: &TaskId,
    ) -> Result<DependencyDensity, EngineError> {
        if !graph.contains(task_id) {
            return Err(EngineError::UnknownTask(task_id.clone()));
        }
        Ok(count_dependencies(graph, task_id))
    }

    /// Evaluate a batch of tasks concurrently.
    ///
    /// Each task runs on an independent worker with shared read-only
    /// access to the graph; failures are collected per task alongside the
    /// sibling successes.
    pub async fn evaluate_batch(
        &self,
        graph: Arc<DependencyGraph>,
        task_ids: Vec<TaskId>,
    ) -> BatchReport {
        let mut handles = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            let engine = self.clone();
            let graph = Arc::clone(&graph);
            handles.push(tokio::spawn(async move {
                let outcome = engine.evaluate(&graph, &task_id);
                (task_id, outcome)
            }));
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((_, Ok(result))) => results.push(result),
                Ok((task_id, Err(err))) => failures.push(BatchFailure {
                    task_id,
                    error: err,
                }),
                Err(join_err) => error!("batch worker panicked: {join_err}"),
            }
        }

        BatchReport {
            results,
            failures,
            evaluated_at: chrono::Utc::now(),
        }
    }
}
