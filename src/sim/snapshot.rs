//! Read-only view of the simulation for presentation
//!
//! Pulled once per frame. Owns its data so the caller can keep it across ticks
//! or serialize it.

use serde::Serialize;

use super::events::EventPhase;
use super::factor::{Factor, FactorMap};
use super::game::{GameManager, GamePhase};
use super::powerups::PowerUpKind;
use super::state::HealthState;
use crate::achievements::Achievement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorView {
    pub factor: Factor,
    pub value: f32,
    /// Display unit ("°C", "ppt", empty for pH)
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    pub optimal: f32,
    /// Player holds exclusive control (highlight the control)
    pub player_owned: bool,
    /// Outside the damage threshold
    pub damaging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveEventView {
    pub description: String,
    pub time_remaining: f32,
    pub effects: FactorMap<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundView {
    pub index: u32,
    pub total: u32,
    pub time_remaining: f32,
    /// Fraction of the round already played (0..=1)
    pub progress: f32,
    pub difficulty_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub health: f32,
    pub health_state: HealthState,
    pub factors: FactorMap<FactorView>,
    pub event_phase: EventPhase,
    pub active_event: Option<ActiveEventView>,
    pub warning: Option<String>,
    pub round: RoundView,
    pub score: u64,
    pub elapsed_time: f32,
    pub events_handled: u32,
    pub offered_power_up: Option<PowerUpKind>,
    pub active_power_ups: Vec<(PowerUpKind, f32)>,
    pub achievements: Vec<Achievement>,
}

impl Snapshot {
    pub fn factor(&self, factor: Factor) -> &FactorView {
        &self.factors[factor]
    }
}

impl GameManager {
    /// Capture the current state for display
    pub fn snapshot(&self) -> Snapshot {
        let env = &self.env;
        let owned = self.control.player_flags();
        let factors = env.specs().map(|factor, spec| {
            let value = env.value(factor);
            FactorView {
                factor,
                value,
                unit: factor.unit(),
                min: spec.min,
                max: spec.max,
                optimal: spec.optimal,
                player_owned: owned[factor],
                damaging: spec.deviation(value) > spec.damage_threshold,
            }
        });

        let active_event = self.scheduler.active().map(|event| ActiveEventView {
            description: event.description.clone(),
            time_remaining: event.time_remaining.max(0.0),
            effects: event.effects,
        });

        Snapshot {
            phase: self.phase,
            health: env.health(),
            health_state: env.health_state(),
            factors,
            event_phase: self.scheduler.phase(),
            active_event,
            warning: self.scheduler.warning_message(),
            round: RoundView {
                index: self.round.index,
                total: self.round.total,
                time_remaining: self.round.time_remaining.max(0.0),
                progress: self.round.progress(),
                difficulty_multiplier: self.round.difficulty_multiplier,
            },
            score: self.score,
            elapsed_time: self.elapsed_time,
            events_handled: self.scheduler.events_handled(),
            offered_power_up: self.powerups.offered(),
            active_power_ups: self.powerups.active(),
            achievements: self.achievements.unlocked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::sim::events::Event;
    use crate::sim::factor::{Factor, FactorMap};
    use crate::sim::game::{GameManager, GamePhase};
    use crate::sim::state::HealthState;

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = GameManager::new(SimConfig::default().without_events());
        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Menu);
        assert_eq!(snap.round.index, 1);

        game.start_game();
        game.handle_player_action(Factor::Salinity, 35.5);
        game.force_event(Event::new("Acid", FactorMap::new(0.0, -0.1, 0.0), 6.0, 10.0));
        game.tick(0.1);

        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.health_state, HealthState::Healthy);
        assert_eq!(snap.factor(Factor::Salinity).value, 35.5);
        assert!(snap.factor(Factor::Salinity).player_owned);
        assert!(snap.factor(Factor::Salinity).damaging);
        assert!(!snap.factor(Factor::Ph).player_owned);
        let event = snap.active_event.as_ref().expect("active event");
        assert_eq!(event.description, "Acid");
        assert!((event.time_remaining - 5.9).abs() < 1e-4);
        assert!(snap.warning.is_none());
        assert!((snap.round.time_remaining - 59.9).abs() < 1e-3);
        assert!(snap.round.progress > 0.0 && snap.round.progress < 0.01);
        assert_eq!(snap.factor(Factor::Temperature).unit, "°C");
        assert_eq!(snap.factor(Factor::Ph).unit, "");
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = GameManager::new(SimConfig::default());
        game.start_game();
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("\"health\":100.0"));
    }
}
