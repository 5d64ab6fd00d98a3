//! Power-ups
//!
//! A closed set of timed effects. The game manager reads the effect scales
//! each tick; nothing here reaches into other systems.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PowerUpConfig;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// "Stabilizer": halves deviation damage
    DamageReduction,
    /// "Rapid Recovery": doubles regeneration
    RegenBoost,
    /// "Event Shield": blocks the next event that would go active
    EventShield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::DamageReduction,
        PowerUpKind::RegenBoost,
        PowerUpKind::EventShield,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::DamageReduction => "Stabilizer",
            PowerUpKind::RegenBoost => "Rapid Recovery",
            PowerUpKind::EventShield => "Event Shield",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PowerUpKind::DamageReduction => "Reduces environmental damage",
            PowerUpKind::RegenBoost => "Doubles health regeneration",
            PowerUpKind::EventShield => "Blocks the next negative event",
        }
    }

    /// Effect duration in seconds
    pub fn duration(&self) -> f32 {
        match self {
            PowerUpKind::DamageReduction => 15.0,
            PowerUpKind::RegenBoost => 10.0,
            PowerUpKind::EventShield => 20.0,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            PowerUpKind::DamageReduction => 0,
            PowerUpKind::RegenBoost => 1,
            PowerUpKind::EventShield => 2,
        }
    }
}

/// Offer timer plus the remaining time of each active effect
#[derive(Debug, Clone)]
pub struct PowerUps {
    config: PowerUpConfig,
    offer_timer: f32,
    offered: Option<PowerUpKind>,
    remaining: [f32; 3],
    rng: Pcg32,
}

impl PowerUps {
    pub fn new(config: PowerUpConfig, seed: u64) -> Self {
        let mut powerups = Self {
            config,
            offer_timer: 0.0,
            offered: None,
            remaining: [0.0; 3],
            rng: Pcg32::seed_from_u64(seed),
        };
        powerups.offer_timer = powerups.draw_offer_delay();
        powerups
    }

    /// Count down effects and the offer timer. Returns a newly offered kind.
    pub fn tick(&mut self, dt: f32) -> Option<PowerUpKind> {
        for kind in PowerUpKind::ALL {
            let remaining = &mut self.remaining[kind.slot()];
            if *remaining > 0.0 {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    *remaining = 0.0;
                    log::debug!("Power-up expired: {}", kind.name());
                }
            }
        }

        if !self.config.enabled {
            return None;
        }

        self.offer_timer -= dt;
        if self.offer_timer > 0.0 {
            return None;
        }
        self.offer_timer = self.draw_offer_delay();

        if self.offered.is_some() {
            return None;
        }
        let available: Vec<PowerUpKind> = PowerUpKind::ALL
            .into_iter()
            .filter(|kind| !self.is_active(*kind))
            .collect();
        let kind = *available.choose(&mut self.rng)?;
        log::debug!("Power-up offered: {}", kind.name());
        self.offered = Some(kind);
        Some(kind)
    }

    /// Activate the offered power-up, if any
    pub fn activate(&mut self) -> Option<PowerUpKind> {
        let kind = self.offered.take()?;
        self.grant(kind);
        Some(kind)
    }

    /// Start (or restart) an effect directly
    pub fn grant(&mut self, kind: PowerUpKind) {
        log::info!("Power-up active: {} ({}s)", kind.name(), kind.duration());
        self.remaining[kind.slot()] = kind.duration();
    }

    #[inline]
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining[kind.slot()] > 0.0
    }

    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        self.remaining[kind.slot()]
    }

    pub fn offered(&self) -> Option<PowerUpKind> {
        self.offered
    }

    /// Active effects with their remaining time
    pub fn active(&self) -> Vec<(PowerUpKind, f32)> {
        PowerUpKind::ALL
            .into_iter()
            .filter(|kind| self.is_active(*kind))
            .map(|kind| (kind, self.remaining(kind)))
            .collect()
    }

    /// Multiplier on deviation damage
    pub fn damage_scale(&self) -> f32 {
        if self.is_active(PowerUpKind::DamageReduction) { 0.5 } else { 1.0 }
    }

    /// Multiplier on regeneration
    pub fn regen_scale(&self) -> f32 {
        if self.is_active(PowerUpKind::RegenBoost) { 2.0 } else { 1.0 }
    }

    /// Use up the event shield. Returns false when no shield was up.
    pub fn consume_shield(&mut self) -> bool {
        if !self.is_active(PowerUpKind::EventShield) {
            return false;
        }
        self.remaining[PowerUpKind::EventShield.slot()] = 0.0;
        true
    }

    fn draw_offer_delay(&mut self) -> f32 {
        let (lo, hi) = (self.config.offer_interval_min, self.config.offer_interval_max);
        if hi > lo { self.rng.random_range(lo..=hi) } else { lo }
    }
}
