//! CoopVal surplus engine.
//!
//! Computes a risk-discounted cooperative surplus value for tasks embedded
//! in a causal dependency graph. The graph may contain cycles, self-loops,
//! and edges to untracked tasks; all are handled structurally by the
//! iterative dependency counter, never as errors.

#![warn(missing_docs)]

mod density;
mod risk;
mod surplus;
mod cluster;
mod error;

pub use density::{DependencyDensity, count_dependencies, reachable_dependencies};
pub use risk::{RiskConfig, RiskModel, LogDampenedRisk};
pub use surplus::{SurplusEngine, SurplusResult, BatchReport, BatchFailure};
pub use cluster::{ClusterConfig, SurplusPool};
pub use error::EngineError;
