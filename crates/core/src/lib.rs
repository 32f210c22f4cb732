//! CoopVal core data models.
//!
//! This crate defines the Impact Vector value representation and the
//! causal dependency graph that the surplus engine reads.

#![warn(missing_docs)]

// Core identities
mod id;

// Value representation
mod impact;

// Causal dependency structure
mod graph;

// Re-exports
pub use id::{TaskId, ClusterId};
pub use impact::{ImpactVector, OutcomeCategory, UncertaintyBounds, ValidationError};
pub use graph::{DependencyGraph, GraphError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
