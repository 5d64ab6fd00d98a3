//! Control arbitration between the player and environmental events
//!
//! Touching a control gives the player exclusive ownership of that factor for a
//! short release window. While the window is open, event deltas for the factor
//! are suppressed.

use serde::{Deserialize, Serialize};

use super::factor::{Factor, FactorMap};

/// Who currently drives a factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Events may act on the factor
    #[default]
    None,
    /// Player holds exclusive control until the release timer runs out
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
struct Slot {
    owner: Owner,
    release_timer: f32,
}

/// Per-factor ownership table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOwnership {
    slots: FactorMap<Slot>,
    release_window: f32,
}

impl ControlOwnership {
    pub fn new(release_window: f32) -> Self {
        Self {
            slots: FactorMap::default(),
            release_window,
        }
    }

    /// Player touched a control: take ownership and restart the window
    pub fn claim(&mut self, factor: Factor) {
        let slot = &mut self.slots[factor];
        if self.release_window > 0.0 {
            slot.owner = Owner::Player;
            slot.release_timer = self.release_window;
        }
    }

    /// Count down release timers, releasing factors that reach zero
    pub fn tick(&mut self, dt: f32) {
        for slot in self.slots.0.iter_mut() {
            if slot.release_timer > 0.0 {
                slot.release_timer -= dt;
                if slot.release_timer <= 0.0 {
                    slot.release_timer = 0.0;
                    slot.owner = Owner::None;
                }
            }
        }
    }

    pub fn owner(&self, factor: Factor) -> Owner {
        self.slots[factor].owner
    }

    #[inline]
    pub fn is_player_owned(&self, factor: Factor) -> bool {
        self.slots[factor].release_timer > 0.0
    }

    pub fn release_timer(&self, factor: Factor) -> f32 {
        self.slots[factor].release_timer
    }

    /// Ownership flags for UI highlighting
    pub fn player_flags(&self) -> FactorMap<bool> {
        FactorMap::from_fn(|factor| self.is_player_owned(factor))
    }

    /// Zero out `effects` for player-owned factors
    pub fn filter_effects(&self, effects: &FactorMap<f32>) -> FactorMap<f32> {
        effects.map(|factor, &delta| {
            if self.is_player_owned(factor) {
                0.0
            } else {
                delta
            }
        })
    }

    pub fn clear(&mut self) {
        self.slots = FactorMap::default();
    }
}
