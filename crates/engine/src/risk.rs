//! Risk discounting.
//!
//! Maps a task's dependency density to a multiplicative discount in
//! (0, 1]. The exact curve is a policy choice behind the [`RiskModel`]
//! trait; the shipped default dampens density logarithmically so the
//! discount grows sub-linearly with graph size.

use crate::density::DependencyDensity;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Validated risk configuration, passed explicitly to every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    dependency_risk_factor: f64,
}

impl RiskConfig {
    /// Create a config, rejecting negative or non-finite factors before
    /// any computation runs.
    pub fn new(dependency_risk_factor: f64) -> Result<Self, EngineError> {
        if dependency_risk_factor < 0.0 || !dependency_risk_factor.is_finite() {
            return Err(EngineError::InvalidRiskFactor(dependency_risk_factor));
        }
        Ok(Self {
            dependency_risk_factor,
        })
    }

    /// The configured risk factor (always >= 0).
    pub fn dependency_risk_factor(&self) -> f64 {
        self.dependency_risk_factor
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            dependency_risk_factor: 0.1,
        }
    }
}

/// Policy mapping dependency density to a discount multiplier.
///
/// Implementations must be monotonic (discount never increases as density
/// or external exposure grows) and honor the boundary behaviors: a zero
/// risk factor or zero dependencies yields 1.0, and the result always
/// stays within (0, 1].
pub trait RiskModel: Send + Sync {
    /// Compute the discount for the given density and risk factor.
    fn discount(&self, density: DependencyDensity, risk_factor: f64) -> f64;
}

/// Default risk model.
///
/// ```text
/// external_ratio = external / max(total, 1)
/// raw_penalty    = factor * (1 + external_ratio) * ln(1 + total)
/// discount       = 1 / (1 + raw_penalty)
/// ```
///
/// The `1/(1+x)` form clamps naturally to (0, 1]; the log term keeps the
/// penalty sub-linear in the number of dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDampenedRisk;

impl RiskModel for LogDampenedRisk {
    fn discount(&self, density: DependencyDensity, risk_factor: f64) -> f64 {
        let raw_penalty = risk_factor
            * (1.0 + density.external_ratio())
            * (1.0 + density.total as f64).ln();
        1.0 / (1.0 + raw_penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn density(total: usize, external: usize) -> DependencyDensity {
        DependencyDensity { total, external }
    }

    #[test]
    fn test_rejects_negative_factor() {
        assert!(matches!(
            RiskConfig::new(-0.1),
            Err(EngineError::InvalidRiskFactor(_))
        ));
        assert!(matches!(
            RiskConfig::new(f64::NAN),
            Err(EngineError::InvalidRiskFactor(_))
        ));
        assert!(RiskConfig::new(0.0).is_ok());
    }

    #[test]
    fn test_zero_factor_means_no_discount() {
        let model = LogDampenedRisk;
        assert_eq!(model.discount(density(50, 10), 0.0), 1.0);
    }

    #[test]
    fn test_zero_dependencies_means_no_discount() {
        let model = LogDampenedRisk;
        assert_eq!(model.discount(density(0, 0), 5.0), 1.0);
    }

    #[test]
    fn test_discount_within_unit_interval() {
        let model = LogDampenedRisk;
        for (total, external, factor) in
            [(1, 0, 0.01), (1, 1, 0.5), (100, 50, 2.0), (10_000, 10_000, 50.0)]
        {
            let d = model.discount(density(total, external), factor);
            assert!(d > 0.0 && d <= 1.0, "discount {d} out of range");
        }
    }

    #[test]
    fn test_monotonic_in_risk_factor() {
        let model = LogDampenedRisk;
        let d = density(3, 1);
        assert!(model.discount(d, 0.5) < model.discount(d, 0.01));
    }

    #[test]
    fn test_monotonic_in_density() {
        let model = LogDampenedRisk;
        assert!(model.discount(density(10, 0), 0.5) < model.discount(density(2, 0), 0.5));
    }

    #[test]
    fn test_monotonic_in_external_exposure() {
        let model = LogDampenedRisk;
        assert!(model.discount(density(10, 8), 0.5) < model.discount(density(10, 1), 0.5));
    }

    #[test]
    fn test_heavy_external_exposure_with_high_factor_approaches_zero() {
        let model = LogDampenedRisk;
        let d = model.discount(density(1000, 1000), 100.0);
        assert!(d < 0.01);
    }
}
