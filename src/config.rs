//! Immutable simulation configuration
//!
//! Built once at startup (defaults, or JSON via [`SimConfig::from_json_str`]) and
//! handed to [`crate::sim::GameManager::new`]. Tests construct alternate bundles
//! (short rounds, events disabled) directly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::difficulty::Difficulty;
use crate::sim::factor::{Factor, FactorMap, FactorSpec, default_factor_specs};

/// Configuration loading/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// Per-factor specs, keyed by name in JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorsConfig {
    pub temperature: FactorSpec,
    pub ph: FactorSpec,
    pub salinity: FactorSpec,
}

impl Default for FactorsConfig {
    fn default() -> Self {
        let specs = default_factor_specs();
        Self {
            temperature: specs[Factor::Temperature],
            ph: specs[Factor::Ph],
            salinity: specs[Factor::Salinity],
        }
    }
}

impl FactorsConfig {
    pub fn table(&self) -> FactorMap<FactorSpec> {
        FactorMap::new(self.temperature, self.ph, self.salinity)
    }
}

/// Health regeneration tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Seconds all factors must stay in the regen band before healing
    pub regen_delay: f32,
    /// HP per second once regenerating
    pub regen_rate: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            regen_delay: HEALTH_REGEN_DELAY,
            regen_rate: HEALTH_REGEN_RATE,
        }
    }
}

/// Event scheduler timing (base values at difficulty multiplier 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// When false the scheduler never leaves Idle
    pub enabled: bool,
    pub interval_min: f32,
    pub interval_max: f32,
    pub warning_time: f32,
    pub min_gap: f32,
    pub cooldown: f32,
    pub duration_min: f32,
    pub duration_max: f32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_min: EVENT_INTERVAL_MIN,
            interval_max: EVENT_INTERVAL_MAX,
            warning_time: EVENT_WARNING_TIME,
            min_gap: EVENT_MIN_GAP,
            cooldown: EVENT_COOLDOWN,
            duration_min: EVENT_DURATION_MIN,
            duration_max: EVENT_DURATION_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub total: u32,
    pub duration: f32,
    pub difficulty_step: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            total: TOTAL_ROUNDS,
            duration: ROUND_DURATION,
            difficulty_step: ROUND_DIFFICULTY_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Exclusive player control window after an action (seconds)
    pub release_window: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            release_window: RELEASE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub enabled: bool,
    pub offer_interval_min: f32,
    pub offer_interval_max: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offer_interval_min: 20.0,
            offer_interval_max: 40.0,
        }
    }
}

/// Complete configuration bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Difficulty selected at startup
    pub difficulty: Difficulty,
    pub factors: FactorsConfig,
    pub health: HealthConfig,
    pub events: EventConfig,
    pub rounds: RoundConfig,
    pub control: ControlConfig,
    pub powerups: PowerUpConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            difficulty: Difficulty::default(),
            factors: FactorsConfig::default(),
            health: HealthConfig::default(),
            events: EventConfig::default(),
            rounds: RoundConfig::default(),
            control: ControlConfig::default(),
            powerups: PowerUpConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(content)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} rounds x {}s, difficulty {}",
            config.rounds.total,
            config.rounds.duration,
            config.difficulty.as_str()
        );
        Ok(config)
    }

    /// Check every section, reporting all problems at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (factor, spec) in self.factors.table().iter() {
            let name = factor.as_str();
            if !(spec.min < spec.max) {
                errors.push(format!(
                    "{name}: min must be < max, got [{}, {}]",
                    spec.min, spec.max
                ));
            }
            if !(spec.min..=spec.max).contains(&spec.optimal) {
                errors.push(format!(
                    "{name}: optimal {} outside [{}, {}]",
                    spec.optimal, spec.min, spec.max
                ));
            }
            if !(spec.damage_threshold > 0.0) {
                errors.push(format!(
                    "{name}: damage_threshold must be > 0, got {}",
                    spec.damage_threshold
                ));
            }
            if !(spec.regen_threshold > 0.0) {
                errors.push(format!(
                    "{name}: regen_threshold must be > 0, got {}",
                    spec.regen_threshold
                ));
            }
            if !(spec.damage_weight >= 0.0) {
                errors.push(format!(
                    "{name}: damage_weight must be >= 0, got {}",
                    spec.damage_weight
                ));
            }
        }

        if !(self.health.regen_delay >= 0.0) {
            errors.push(format!(
                "health.regen_delay must be >= 0, got {}",
                self.health.regen_delay
            ));
        }
        if !(self.health.regen_rate >= 0.0) {
            errors.push(format!(
                "health.regen_rate must be >= 0, got {}",
                self.health.regen_rate
            ));
        }

        let ev = &self.events;
        if !(ev.interval_min > 0.0 && ev.interval_min <= ev.interval_max) {
            errors.push(format!(
                "events: need 0 < interval_min <= interval_max, got [{}, {}]",
                ev.interval_min, ev.interval_max
            ));
        }
        if !(ev.duration_min > 0.0 && ev.duration_min <= ev.duration_max) {
            errors.push(format!(
                "events: need 0 < duration_min <= duration_max, got [{}, {}]",
                ev.duration_min, ev.duration_max
            ));
        }
        if !(ev.warning_time >= 0.0 && ev.min_gap >= 0.0 && ev.cooldown >= 0.0) {
            errors.push("events: warning_time, min_gap and cooldown must be >= 0".to_string());
        }

        if self.rounds.total == 0 {
            errors.push("rounds.total must be > 0. Example: \"total\": 10".to_string());
        }
        if !(self.rounds.duration > 0.0) {
            errors.push(format!(
                "rounds.duration must be > 0, got {}. Example: \"duration\": 60.0",
                self.rounds.duration
            ));
        }
        if !(self.rounds.difficulty_step >= 0.0) {
            errors.push(format!(
                "rounds.difficulty_step must be >= 0, got {}",
                self.rounds.difficulty_step
            ));
        }

        if !(self.control.release_window >= 0.0) {
            errors.push(format!(
                "control.release_window must be >= 0, got {}",
                self.control.release_window
            ));
        }

        let pu = &self.powerups;
        if pu.enabled && !(pu.offer_interval_min > 0.0 && pu.offer_interval_min <= pu.offer_interval_max) {
            errors.push(format!(
                "powerups: need 0 < offer_interval_min <= offer_interval_max, got [{}, {}]",
                pu.offer_interval_min, pu.offer_interval_max
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Same config with events switched off (scheduler stays Idle)
    pub fn without_events(mut self) -> Self {
        self.events.enabled = false;
        self
    }

    /// Same config with power-up offers switched off
    pub fn without_powerups(mut self) -> Self {
        self.powerups.enabled = false;
        self
    }

    pub fn with_rounds(mut self, total: u32, duration: f32) -> Self {
        self.rounds.total = total;
        self.rounds.duration = duration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn test_documented_defaults() {
        let config = SimConfig::default();
        let table = config.factors.table();
        assert_eq!(table[Factor::Temperature].optimal, 26.0);
        assert_eq!(table[Factor::Ph].min, 7.5);
        assert_eq!(table[Factor::Salinity].max, 36.0);
        assert_eq!(config.rounds.total, 10);
        assert_eq!(config.rounds.duration, 60.0);
        assert_eq!(config.control.release_window, 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "seed": 7, "rounds": { "total": 3 }, "difficulty": "hard" }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.rounds.total, 3);
        assert_eq!(config.rounds.duration, ROUND_DURATION);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(config.events.enabled);
    }

    #[test]
    fn test_invalid_collects_all_errors() {
        let err = SimConfig::from_json_str(
            r#"{ "rounds": { "total": 0, "duration": -1.0 },
                 "factors": { "ph": { "min": 9.0, "max": 8.0, "optimal": 8.2,
                   "damage_threshold": 0.3, "regen_threshold": 0.1,
                   "balance_threshold": 0.2, "damage_weight": 2.0 } } }"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid(errors) => {
                assert!(errors.len() >= 3, "{errors:?}");
                assert!(errors.iter().any(|e| e.contains("rounds.total")));
                assert!(errors.iter().any(|e| e.starts_with("pH")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("here.json"));
    }
}
