//! Impact Vector - the multi-dimensional value representation of a task.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::TaskId;

/// Domain classification of a task's projected impact.
///
/// The taxonomy is open-ended: the engine never interprets categories
/// beyond using them as domain-weight lookup keys, so unknown tags are
/// carried through as [`OutcomeCategory::Custom`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutcomeCategory {
    /// Direct revenue impact
    Revenue,
    /// Research and exploration value
    Research,
    /// Operational efficiency gains
    Efficiency,
    /// Social or community value
    Social,
    /// Ecosystem-level effects
    Ecosystem,
    /// Technical improvements (infrastructure, tooling)
    Technical,
    /// Any category outside the built-in set
    Custom(String),
}

impl OutcomeCategory {
    /// Canonical string form, used as the domain-weight lookup key.
    pub fn as_str(&self) -> &str {
        match self {
            OutcomeCategory::Revenue => "revenue",
            OutcomeCategory::Research => "research",
            OutcomeCategory::Efficiency => "efficiency",
            OutcomeCategory::Social => "social",
            OutcomeCategory::Ecosystem => "ecosystem",
            OutcomeCategory::Technical => "technical",
            OutcomeCategory::Custom(tag) => tag,
        }
    }
}

impl From<String> for OutcomeCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "revenue" => OutcomeCategory::Revenue,
            "research" => OutcomeCategory::Research,
            "efficiency" => OutcomeCategory::Efficiency,
            "social" => OutcomeCategory::Social,
            "ecosystem" => OutcomeCategory::Ecosystem,
            "technical" => OutcomeCategory::Technical,
            _ => OutcomeCategory::Custom(s),
        }
    }
}

impl From<OutcomeCategory> for String {
    fn from(c: OutcomeCategory) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval around a magnitude projection.
///
/// Invariant: `low <= magnitude <= high`. Carried as data only; the engine
/// never simulates within the interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyBounds {
    /// Lower bound of the projected magnitude
    pub low: f64,
    /// Upper bound of the projected magnitude
    pub high: f64,
}

impl UncertaintyBounds {
    /// Create new bounds.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `magnitude` lies within the interval.
    pub fn contains(&self, magnitude: f64) -> bool {
        self.low <= magnitude && magnitude <= self.high
    }
}

/// A multi-dimensional representation of a task's downstream impact.
///
/// Impact Vectors are constructed upstream by the ingestion collaborator
/// and are immutable once loaded into a [`crate::DependencyGraph`]; the
/// surplus engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactVector {
    /// Domain classification, routed to domain weights
    pub outcome_category: OutcomeCategory,

    /// Expected scale of the impact; negative = cost, positive = benefit
    pub magnitude_projection: f64,

    /// Duration until the impact fully realizes (arbitrary units,
    /// pass-through weighting input)
    pub time_horizon: f64,

    /// Interval around the magnitude projection
    pub uncertainty_bounds: UncertaintyBounds,

    /// Tasks this task's impact causally depends on; may name tasks
    /// absent from the graph (external dependencies)
    #[serde(default)]
    pub causal_dependencies: Vec<TaskId>,

    /// Scaling factor per outcome category; missing entry means 1.0
    #[serde(default)]
    pub domain_weights: HashMap<String, f64>,
}

impl ImpactVector {
    /// Create a vector with no dependencies and no explicit weights.
    pub fn new(
        outcome_category: OutcomeCategory,
        magnitude_projection: f64,
        time_horizon: f64,
        uncertainty_bounds: UncertaintyBounds,
    ) -> Self {
        Self {
            outcome_category,
            magnitude_projection,
            time_horizon,
            uncertainty_bounds,
            causal_dependencies: Vec::new(),
            domain_weights: HashMap::new(),
        }
    }

    /// Attach causal dependencies.
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.causal_dependencies = deps.into_iter().collect();
        self
    }

    /// Attach a domain weight.
    pub fn with_weight(mut self, key: impl Into<String>, weight: f64) -> Self {
        self.domain_weights.insert(key.into(), weight);
        self
    }

    /// Resolve the weight for this vector's own category.
    ///
    /// A missing entry defaults to 1.0 (neutral scaling). This is an
    /// explicit policy: the taxonomy is supplied externally and the engine
    /// must not treat an unmapped category as an error.
    pub fn weight_for_category(&self) -> f64 {
        self.domain_weights
            .get(self.outcome_category.as_str())
            .copied()
            .unwrap_or(1.0)
    }

    /// Check the vector's structural invariants.
    ///
    /// Called at the ingestion boundary (graph insertion) so the surplus
    /// computation path can assume validated input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.magnitude_projection.is_finite() {
            return Err(ValidationError::NonFiniteMagnitude(self.magnitude_projection));
        }
        if !self.uncertainty_bounds.contains(self.magnitude_projection) {
            return Err(ValidationError::BoundsViolation {
                low: self.uncertainty_bounds.low,
                magnitude: self.magnitude_projection,
                high: self.uncertainty_bounds.high,
            });
        }
        for (key, weight) in &self.domain_weights {
            if *weight < 0.0 || !weight.is_finite() {
                return Err(ValidationError::NegativeWeight {
                    key: key.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }
}

/// Errors detected when an Impact Vector is loaded into a graph.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// Magnitude is NaN or infinite
    #[error("magnitude projection is not finite: {0}")]
    NonFiniteMagnitude(f64),

    /// `low <= magnitude <= high` does not hold
    #[error("uncertainty bounds violated: low {low} <= magnitude {magnitude} <= high {high} must hold")]
    BoundsViolation {
        /// Lower bound
        low: f64,
        /// The magnitude projection
        magnitude: f64,
        /// Upper bound
        high: f64,
    },

    /// A domain weight is negative or non-finite
    #[error("domain weight for '{key}' must be a non-negative finite number, got {weight}")]
    NegativeWeight {
        /// Weight table key
        key: String,
        /// The offending weight
        weight: f64,
    },
}
