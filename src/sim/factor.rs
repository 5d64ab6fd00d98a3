//! Environmental factors and per-factor tables

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the three environmental parameters the reef responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Temperature,
    Ph,
    Salinity,
}

impl Factor {
    /// All factors in table order
    pub const ALL: [Factor; 3] = [Factor::Temperature, Factor::Ph, Factor::Salinity];

    /// Slot in a [`FactorMap`]
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Factor::Temperature => 0,
            Factor::Ph => 1,
            Factor::Salinity => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Temperature => "Temperature",
            Factor::Ph => "pH",
            Factor::Salinity => "Salinity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Factor::Temperature => "°C",
            Factor::Ph => "",
            Factor::Salinity => "ppt",
        }
    }
}

/// Fixed-size table holding one `T` per factor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorMap<T>(pub [T; 3]);

impl<T: Copy> FactorMap<T> {
    /// Same value for every factor
    pub const fn splat(value: T) -> Self {
        Self([value; 3])
    }
}

impl<T> FactorMap<T> {
    pub const fn new(temperature: T, ph: T, salinity: T) -> Self {
        Self([temperature, ph, salinity])
    }

    /// Build a table by evaluating `f` for each factor
    pub fn from_fn(mut f: impl FnMut(Factor) -> T) -> Self {
        Self(Factor::ALL.map(&mut f))
    }

    /// Iterate `(factor, &value)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (Factor, &T)> {
        Factor::ALL.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Factor, &T) -> U) -> FactorMap<U> {
        FactorMap::from_fn(|factor| f(factor, &self[factor]))
    }
}

impl<T> Index<Factor> for FactorMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, factor: Factor) -> &T {
        &self.0[factor.index()]
    }
}

impl<T> IndexMut<Factor> for FactorMap<T> {
    #[inline]
    fn index_mut(&mut self, factor: Factor) -> &mut T {
        &mut self.0[factor.index()]
    }
}

/// Static description of one factor: valid range, optimum and health bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorSpec {
    pub min: f32,
    pub max: f32,
    pub optimal: f32,
    /// Deviation beyond which health takes damage
    pub damage_threshold: f32,
    /// Deviation within which health may regenerate (tighter than damage)
    pub regen_threshold: f32,
    /// Deviation within which the reef counts as perfectly balanced
    pub balance_threshold: f32,
    /// Damage per unit of deviation per second (before difficulty scaling)
    pub damage_weight: f32,
}

impl FactorSpec {
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        crate::clamp_or(value, self.min, self.max, self.optimal)
    }

    #[inline]
    pub fn deviation(&self, value: f32) -> f32 {
        (value - self.optimal).abs()
    }

    #[inline]
    pub fn in_regen_band(&self, value: f32) -> bool {
        self.deviation(value) <= self.regen_threshold
    }

    #[inline]
    pub fn in_balance_band(&self, value: f32) -> bool {
        self.deviation(value) < self.balance_threshold
    }
}

/// Default factor table
pub fn default_factor_specs() -> FactorMap<FactorSpec> {
    FactorMap::new(
        FactorSpec {
            min: 20.0,
            max: 32.0,
            optimal: 26.0,
            damage_threshold: 2.0,
            regen_threshold: 0.5,
            balance_threshold: 1.0,
            damage_weight: 4.0,
        },
        FactorSpec {
            min: 7.5,
            max: 8.5,
            optimal: 8.2,
            damage_threshold: 0.3,
            regen_threshold: 0.1,
            balance_threshold: 0.2,
            damage_weight: 2.0,
        },
        FactorSpec {
            min: 30.0,
            max: 36.0,
            optimal: 33.0,
            damage_threshold: 1.0,
            regen_threshold: 0.5,
            balance_threshold: 1.0,
            damage_weight: 3.0,
        },
    )
}
