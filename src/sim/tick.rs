//! Simulation tick
//!
//! Core game loop step. Ordering within one tick:
//! 1. round timer (expiry ends the round and skips the rest)
//! 2. event scheduler
//! 3. control ownership timers
//! 4. event deltas for factors the player does not own
//! 5. queued player targets
//! 6. damage, then regeneration
//! 7. power-ups, elapsed time, achievements
//! 8. health <= 0 ends the game

use super::events::EventTransition;
use super::factor::{Factor, FactorMap};
use super::game::{GameEvent, GameManager, GamePhase};
use crate::achievements::AchievementInput;

impl GameManager {
    /// Advance the game by `dt` seconds. No-op outside Playing.
    ///
    /// `dt` is used as given (no sub-stepping); negative or non-finite values
    /// count as zero.
    pub fn tick(&mut self, dt: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let dt = crate::sanitize_dt(dt);

        if self.round.tick(dt) {
            self.handle_round_end();
            return;
        }

        let preset = self.preset();

        // Event clock runs at the preset's frequency
        let transitions = self.scheduler.tick(dt * preset.event_frequency);
        self.handle_transitions(&transitions);

        self.control.tick(dt);

        let effects = self.control.filter_effects(&self.scheduler.current_effects());
        for (factor, &delta) in effects.iter() {
            if delta != 0.0 {
                self.env.apply_delta(factor, delta, dt);
            }
        }

        self.apply_queued_inputs();

        let damage_rate = preset.damage_rate() * self.powerups.damage_scale();
        self.env.tick_damage(dt, damage_rate);
        let regen_rate = self.config.health.regen_rate * self.powerups.regen_scale();
        self.env
            .tick_regeneration(dt, self.config.health.regen_delay, regen_rate);

        if let Some(kind) = self.powerups.tick(dt) {
            self.notifications.push(GameEvent::PowerUpOffered(kind));
        }

        self.elapsed_time += dt;

        let unlocked = self.achievements.update(
            dt,
            AchievementInput {
                balanced: self.env.is_balanced(),
                health: self.env.health(),
                events_handled: self.scheduler.events_handled(),
            },
        );
        self.notifications
            .extend(unlocked.into_iter().map(GameEvent::AchievementUnlocked));

        if self.env.health() <= 0.0 {
            self.enter_game_over();
        }
    }

    fn handle_transitions(&mut self, transitions: &[EventTransition]) {
        for transition in transitions {
            match transition {
                EventTransition::Warned(message) => {
                    self.notifications
                        .push(GameEvent::EventWarning(message.clone()));
                }
                EventTransition::Activated => {
                    if self.powerups.consume_shield() {
                        if let Some(event) = self.scheduler.cancel_active() {
                            log::info!("Event blocked by shield: {}", event.description);
                            self.notifications
                                .push(GameEvent::EventBlocked(event.description));
                        }
                    } else if let Some(event) = self.scheduler.active() {
                        self.notifications
                            .push(GameEvent::EventStarted(event.description.clone()));
                    }
                }
                EventTransition::Ended => self.notifications.push(GameEvent::EventEnded),
                EventTransition::Ready => {}
            }
        }
    }

    fn apply_queued_inputs(&mut self) {
        let queued = std::mem::replace(&mut self.queued, FactorMap::splat(None));
        for factor in Factor::ALL {
            if let Some(value) = queued[factor] {
                self.env.set_value(factor, value);
            }
        }
    }
}
