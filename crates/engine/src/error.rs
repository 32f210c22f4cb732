//! Error type for surplus computations.

use coopval_core::TaskId;

/// Errors that can occur during surplus evaluation.
///
/// Cycles, self-loops, and external dependencies are deliberately absent
/// here: those are valid graph shapes, not failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Requested task has no Impact Vector in the graph
    #[error("unknown task: '{0}' has no impact vector in the graph")]
    UnknownTask(TaskId),

    /// Risk factor must be non-negative
    #[error("invalid risk factor: {0} (must be >= 0)")]
    InvalidRiskFactor(f64),
}
