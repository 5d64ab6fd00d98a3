//! Environmental state and the reef damage model
//!
//! Holds the three factor values and reef health. Every mutation clamps:
//! factor values stay inside their declared range, health inside [0, 100].

use serde::{Deserialize, Serialize};

use super::factor::{Factor, FactorMap, FactorSpec};
use crate::consts::*;

/// Health category shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    /// Health >= 70
    Healthy,
    /// Health >= 30
    Stressed,
    /// Health < 30
    Bleached,
}

impl HealthState {
    pub fn from_health(health: f32) -> Self {
        if health >= HEALTHY_THRESHOLD {
            HealthState::Healthy
        } else if health >= STRESSED_THRESHOLD {
            HealthState::Stressed
        } else {
            HealthState::Bleached
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Stressed => "stressed",
            HealthState::Bleached => "bleached",
        }
    }
}

/// Current reef conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalState {
    specs: FactorMap<FactorSpec>,
    values: FactorMap<f32>,
    health: f32,
    /// Seconds all factors have continuously been inside the regen band
    regen_timer: f32,
}

impl EnvironmentalState {
    /// All factors at optimum, health clamped into [0, 100]
    pub fn new(specs: FactorMap<FactorSpec>, health: f32) -> Self {
        Self {
            specs,
            values: specs.map(|_, spec| spec.optimal),
            health: clamp_health(health),
            regen_timer: 0.0,
        }
    }

    pub fn spec(&self, factor: Factor) -> &FactorSpec {
        &self.specs[factor]
    }

    pub fn specs(&self) -> &FactorMap<FactorSpec> {
        &self.specs
    }

    #[inline]
    pub fn value(&self, factor: Factor) -> f32 {
        self.values[factor]
    }

    pub fn values(&self) -> &FactorMap<f32> {
        &self.values
    }

    pub fn temperature(&self) -> f32 {
        self.values[Factor::Temperature]
    }

    pub fn ph(&self) -> f32 {
        self.values[Factor::Ph]
    }

    pub fn salinity(&self) -> f32 {
        self.values[Factor::Salinity]
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn regen_timer(&self) -> f32 {
        self.regen_timer
    }

    /// Distance of a factor from its optimum
    pub fn deviation(&self, factor: Factor) -> f32 {
        self.specs[factor].deviation(self.values[factor])
    }

    /// Add `delta * dt` to a factor, clamped to its range
    pub fn apply_delta(&mut self, factor: Factor, delta: f32, dt: f32) {
        let spec = &self.specs[factor];
        let current = self.values[factor];
        let next = current + delta * dt;
        // A NaN delta leaves the value untouched
        self.values[factor] = crate::clamp_or(next, spec.min, spec.max, current);
    }

    /// Assign a factor directly, clamped to its range. Returns the stored value.
    pub fn set_value(&mut self, factor: Factor, value: f32) -> f32 {
        let clamped = self.specs[factor].clamp(value);
        self.values[factor] = clamped;
        clamped
    }

    /// Return every factor to its optimum (health untouched)
    pub fn reset_factors(&mut self) {
        self.values = self.specs.map(|_, spec| spec.optimal);
        self.regen_timer = 0.0;
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = clamp_health(health);
    }

    /// Apply deviation damage for `dt` seconds. Returns health lost.
    ///
    /// Each factor further than its damage threshold from optimum costs
    /// `deviation * weight * rate` HP per second.
    pub fn tick_damage(&mut self, dt: f32, rate: f32) -> f32 {
        let before = self.health;
        let mut damage = 0.0;
        for (factor, spec) in self.specs.iter() {
            let diff = spec.deviation(self.values[factor]);
            if diff > spec.damage_threshold {
                damage += diff * spec.damage_weight * rate * dt;
            }
        }
        self.health = clamp_health(self.health - damage);
        before - self.health
    }

    /// Regenerate health once every factor has stayed inside its regen band
    /// for `delay` seconds. Returns health gained.
    pub fn tick_regeneration(&mut self, dt: f32, delay: f32, rate: f32) -> f32 {
        if !self.in_regen_band() {
            self.regen_timer = 0.0;
            return 0.0;
        }

        self.regen_timer += dt;
        // Only the part of this step past the delay heals
        let healing_time = (self.regen_timer - delay).min(dt);
        if healing_time <= 0.0 {
            return 0.0;
        }

        let before = self.health;
        self.health = clamp_health(self.health + rate * healing_time);
        self.health - before
    }

    /// True when every factor sits inside its regeneration band
    pub fn in_regen_band(&self) -> bool {
        self.specs
            .iter()
            .all(|(factor, spec)| spec.in_regen_band(self.values[factor]))
    }

    /// True when every factor sits inside its perfect-balance band
    pub fn is_balanced(&self) -> bool {
        self.specs
            .iter()
            .all(|(factor, spec)| spec.in_balance_band(self.values[factor]))
    }

    pub fn health_state(&self) -> HealthState {
        HealthState::from_health(self.health)
    }
}

#[inline]
fn clamp_health(health: f32) -> f32 {
    crate::clamp_or(health, 0.0, MAX_HEALTH, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::factor::default_factor_specs;

    fn state() -> EnvironmentalState {
        EnvironmentalState::new(default_factor_specs(), 100.0)
    }

    #[test]
    fn test_new_is_optimal() {
        let s = state();
        assert_eq!(s.temperature(), 26.0);
        assert_eq!(s.ph(), 8.2);
        assert_eq!(s.salinity(), 33.0);
        assert_eq!(s.health(), 100.0);
    }

    #[test]
    fn test_apply_delta_clamps() {
        let mut s = state();
        s.apply_delta(Factor::Temperature, 3.0, 10.0);
        assert_eq!(s.temperature(), 32.0);
        s.apply_delta(Factor::Ph, -1.0, 5.0);
        assert_eq!(s.ph(), 7.5);
        s.apply_delta(Factor::Salinity, 1.0, 1.5);
        assert!((s.salinity() - 34.5).abs() < 1e-5);
    }

    #[test]
    fn test_no_damage_inside_threshold() {
        let mut s = state();
        s.set_value(Factor::Temperature, 27.9);
        assert_eq!(s.tick_damage(10.0, 1.0), 0.0);
        assert_eq!(s.health(), 100.0);
    }

    #[test]
    fn test_damage_scales_with_deviation() {
        let mut s = state();
        s.set_value(Factor::Temperature, 32.0);
        // 6 deviation * weight 4 * rate 0.1 * 5s = 12
        let lost = s.tick_damage(5.0, 0.1);
        assert!((lost - 12.0).abs() < 1e-4, "lost {lost}");
        assert!((s.health() - 88.0).abs() < 1e-4);
    }

    #[test]
    fn test_health_clamped_at_zero() {
        let mut s = state();
        s.set_value(Factor::Temperature, 20.0);
        s.set_value(Factor::Salinity, 36.0);
        s.tick_damage(1000.0, 1.0);
        assert_eq!(s.health(), 0.0);
        assert_eq!(s.health_state(), HealthState::Bleached);
    }

    #[test]
    fn test_regeneration_needs_continuous_band() {
        let mut s = state();
        s.set_health(50.0);

        // 4s in band: no healing yet
        assert_eq!(s.tick_regeneration(4.0, 5.0, 1.0), 0.0);
        // Leaving the band resets the timer
        s.set_value(Factor::Ph, 8.4);
        s.tick_regeneration(1.0, 5.0, 1.0);
        assert_eq!(s.regen_timer(), 0.0);
        s.set_value(Factor::Ph, 8.2);

        // 5s back in band reaches the delay, the next 2s heal
        assert_eq!(s.tick_regeneration(5.0, 5.0, 1.0), 0.0);
        let healed = s.tick_regeneration(2.0, 5.0, 1.0);
        assert!((healed - 2.0).abs() < 1e-5);
        assert!((s.health() - 52.0).abs() < 1e-5);
    }

    #[test]
    fn test_regeneration_capped() {
        let mut s = state();
        s.set_health(99.5);
        s.tick_regeneration(10.0, 0.0, 1.0);
        assert_eq!(s.health(), 100.0);
    }

    #[test]
    fn test_health_state_bands() {
        assert_eq!(HealthState::from_health(70.0), HealthState::Healthy);
        assert_eq!(HealthState::from_health(69.9), HealthState::Stressed);
        assert_eq!(HealthState::from_health(30.0), HealthState::Stressed);
        assert_eq!(HealthState::from_health(29.9), HealthState::Bleached);
    }
}
