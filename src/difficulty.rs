//! Difficulty presets
//!
//! Each level bundles the balance knobs the game manager reads: how fast
//! deviations hurt, how fast the event clock runs and how much health a run
//! starts with.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Balance bundle for this level
    pub fn preset(&self) -> DifficultyPreset {
        match self {
            Difficulty::Easy => DifficultyPreset {
                health_decrease_rate: 0.05,
                event_frequency: 0.5,
                damage_multiplier: 0.75,
                starting_health: 100.0,
            },
            Difficulty::Normal => DifficultyPreset {
                health_decrease_rate: 0.1,
                event_frequency: 1.0,
                damage_multiplier: 1.0,
                starting_health: 100.0,
            },
            Difficulty::Hard => DifficultyPreset {
                health_decrease_rate: 0.15,
                event_frequency: 1.5,
                damage_multiplier: 1.25,
                starting_health: 80.0,
            },
        }
    }

    /// Leaderboard weighting for runs at this level
    pub fn score_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// Balance values for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Scales deviation damage (HP per unit deviation per weight per second)
    pub health_decrease_rate: f32,
    /// Speed of the event clock relative to wall time
    pub event_frequency: f32,
    /// Extra damage scaling on top of the decrease rate
    pub damage_multiplier: f32,
    /// Health at the start of a run
    pub starting_health: f32,
}

impl DifficultyPreset {
    /// Combined damage scale applied to deviation damage
    #[inline]
    pub fn damage_rate(&self) -> f32 {
        self.health_decrease_rate * self.damage_multiplier
    }
}
