//! Player action gate
//!
//! The only entry point for external input. Requests are sanitized, never
//! rejected: out-of-range values clamp to the factor range, NaN falls back to
//! the optimum.

use super::factor::{Factor, FactorMap, FactorSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerActionGate {
    specs: FactorMap<FactorSpec>,
    /// Last accepted value per factor (what the player's controls show)
    accepted: FactorMap<f32>,
}

impl PlayerActionGate {
    pub fn new(specs: FactorMap<FactorSpec>) -> Self {
        Self {
            specs,
            accepted: specs.map(|_, spec| spec.optimal),
        }
    }

    /// Validate a requested value and return the value the simulation will use
    pub fn submit(&mut self, factor: Factor, requested: f32) -> f32 {
        let value = self.specs[factor].clamp(requested);
        if value != requested {
            log::debug!(
                "{} request {} clamped to {}",
                factor.as_str(),
                requested,
                value
            );
        }
        self.accepted[factor] = value;
        value
    }

    pub fn last_accepted(&self, factor: Factor) -> f32 {
        self.accepted[factor]
    }

    /// Controls back to optimum (new game / new round)
    pub fn reset(&mut self) {
        self.accepted = self.specs.map(|_, spec| spec.optimal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::factor::default_factor_specs;

    #[test]
    fn test_submit_clamps() {
        let mut gate = PlayerActionGate::new(default_factor_specs());
        assert_eq!(gate.submit(Factor::Temperature, 99.0), 32.0);
        assert_eq!(gate.submit(Factor::Ph, 7.0), 7.5);
        assert_eq!(gate.submit(Factor::Salinity, 34.0), 34.0);
        assert_eq!(gate.last_accepted(Factor::Temperature), 32.0);
    }

    #[test]
    fn test_nan_falls_back_to_optimal() {
        let mut gate = PlayerActionGate::new(default_factor_specs());
        assert_eq!(gate.submit(Factor::Ph, f32::NAN), 8.2);
    }

    #[test]
    fn test_reset() {
        let mut gate = PlayerActionGate::new(default_factor_specs());
        gate.submit(Factor::Salinity, 30.0);
        gate.reset();
        assert_eq!(gate.last_accepted(Factor::Salinity), 33.0);
    }
}
