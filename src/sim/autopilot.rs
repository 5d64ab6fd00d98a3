//! Idle/demo player
//!
//! Steers every drifting factor back to its optimum and grabs offered
//! power-ups. Reacts only every `reaction_time` seconds, so a long reaction
//! time lets events get through.

use super::factor::Factor;
use super::game::{GameManager, GamePhase};

#[derive(Debug, Clone)]
pub struct Autopilot {
    reaction_time: f32,
    cooldown: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl Autopilot {
    pub fn new(reaction_time: f32) -> Self {
        Self {
            reaction_time: reaction_time.max(0.0),
            cooldown: 0.0,
        }
    }

    /// Look at the game and push corrective actions. Returns actions taken.
    pub fn step(&mut self, game: &mut GameManager, dt: f32) -> usize {
        if game.phase() != GamePhase::Playing {
            return 0;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return 0;
        }
        self.cooldown = self.reaction_time;

        let effects = game.scheduler().current_effects();
        let mut corrections = Vec::new();
        for factor in Factor::ALL {
            let spec = *game.environment().spec(factor);
            let drifting = game.environment().deviation(factor) > spec.regen_threshold * 0.5;
            let pushed = effects[factor] != 0.0;
            if drifting || pushed {
                corrections.push((factor, spec.optimal));
            }
        }

        for &(factor, target) in &corrections {
            game.handle_player_action(factor, target);
        }
        if game.powerups().offered().is_some() {
            game.activate_power_up();
        }
        corrections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::events::Event;
    use crate::sim::factor::FactorMap;

    #[test]
    fn test_pulls_factor_back() {
        let mut game = GameManager::new(SimConfig::default().without_events());
        game.start_game();
        game.handle_player_action(Factor::Temperature, 30.0);
        game.tick(0.6);
        assert_eq!(game.environment().temperature(), 30.0);

        let mut pilot = Autopilot::default();
        assert_eq!(pilot.step(&mut game, 0.1), 1);
        game.tick(0.1);
        assert_eq!(game.environment().temperature(), 26.0);
    }

    #[test]
    fn test_holds_against_event() {
        let mut game = GameManager::new(SimConfig::default().without_events());
        game.start_game();
        game.force_event(Event::new("Heat", FactorMap::new(3.0, 0.0, 0.0), 8.0, 10.0));
        let mut pilot = Autopilot::new(0.1);
        for _ in 0..60 {
            pilot.step(&mut game, 0.1);
            game.tick(0.1);
        }
        assert_eq!(game.environment().temperature(), 26.0);
        assert_eq!(game.health(), 100.0);
    }

    #[test]
    fn test_idle_outside_playing() {
        let mut game = GameManager::new(SimConfig::default());
        let mut pilot = Autopilot::default();
        assert_eq!(pilot.step(&mut game, 1.0), 0);
    }
}
