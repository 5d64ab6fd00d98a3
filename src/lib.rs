//! Reef Survival - A coral reef ecosystem survival game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (factors, events, control, rounds, game manager)
//! - `config`: Immutable simulation configuration bundle
//! - `difficulty`: Easy/Normal/Hard balance presets
//! - `achievements`: Milestones unlocked during a run
//! - `highscores`: Top-10 leaderboard
//!
//! Rendering, audio, menus and input devices live outside this crate. They push
//! player actions into [`sim::GameManager`] and pull a [`sim::Snapshot`] once per frame.

pub mod achievements;
pub mod config;
pub mod difficulty;
pub mod highscores;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use difficulty::{Difficulty, DifficultyPreset};
pub use highscores::{HighScoreError, HighScores};

/// Game configuration constants
pub mod consts {
    /// Fixed frame step used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame time accepted at the caller boundary (stall guard)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Health bounds
    pub const MAX_HEALTH: f32 = 100.0;
    pub const INITIAL_HEALTH: f32 = 100.0;

    /// Health state cutoffs (presentation only)
    pub const HEALTHY_THRESHOLD: f32 = 70.0;
    pub const STRESSED_THRESHOLD: f32 = 30.0;

    /// Regeneration: seconds in the regen band before healing starts, then HP/s
    pub const HEALTH_REGEN_DELAY: f32 = 5.0;
    pub const HEALTH_REGEN_RATE: f32 = 1.0;

    /// Rounds
    pub const TOTAL_ROUNDS: u32 = 10;
    pub const ROUND_DURATION: f32 = 60.0;
    /// Difficulty growth per round (round N multiplier = 1 + (N-1) * step)
    pub const ROUND_DIFFICULTY_STEP: f32 = 0.1;

    /// Exclusive player control after touching a factor (seconds)
    pub const RELEASE_WINDOW: f32 = 0.5;

    /// Event timing (seconds)
    pub const EVENT_INTERVAL_MIN: f32 = 15.0;
    pub const EVENT_INTERVAL_MAX: f32 = 20.0;
    pub const EVENT_WARNING_TIME: f32 = 5.0;
    pub const EVENT_MIN_GAP: f32 = 10.0;
    pub const EVENT_COOLDOWN: f32 = 10.0;
    pub const EVENT_DURATION_MIN: f32 = 5.0;
    pub const EVENT_DURATION_MAX: f32 = 8.0;

    /// Default run seed
    pub const DEFAULT_SEED: u64 = 0x5EED_C0A1;
}

/// Clamp that also maps NaN onto `fallback`
#[inline]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        // max/min rather than clamp: never panics on an unvalidated range
        value.max(min).min(max)
    }
}

/// Sanitize a frame delta: negative or non-finite values become 0
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}
