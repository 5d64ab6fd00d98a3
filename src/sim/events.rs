//! Environmental event scheduler
//!
//! A single-event phase machine:
//!
//! ```text
//! Idle --(timer >= interval - warning)--> Warning --(timer >= interval)--> Active
//!   ^                                                                       |
//!   +----------------(cooldown elapsed)------ Cooldown <--(event over)------+
//! ```
//!
//! Only one event exists at a time: `pending` while warning, `active` while
//! active. The event clock is driven by the caller's dt, never wall time.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::factor::{Factor, FactorMap};
use crate::config::EventConfig;

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPhase {
    /// Counting toward the next warning
    Idle,
    /// Next event announced, no effect yet
    Warning,
    /// Event effects are being applied
    Active,
    /// Enforced gap after an event
    Cooldown,
}

impl EventPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPhase::Idle => "idle",
            EventPhase::Warning => "warning",
            EventPhase::Active => "active",
            EventPhase::Cooldown => "cooldown",
        }
    }
}

/// Phase change reported by [`EventScheduler::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTransition {
    /// Carries the warning text, which is gone once a cascade reaches Active
    Warned(String),
    Activated,
    Ended,
    Ready,
}

/// Static description of an event kind in the pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTemplate {
    pub description: &'static str,
    /// Factor change per second at difficulty 1.0
    pub effects: FactorMap<f32>,
}

static EVENT_POOL: [EventTemplate; 6] = [
    EventTemplate {
        description: "Heat wave approaching!",
        effects: FactorMap::new(3.0, 0.0, 0.0),
    },
    EventTemplate {
        description: "Cold current detected!",
        effects: FactorMap::new(-3.0, 0.0, 0.0),
    },
    EventTemplate {
        description: "Acid rain affecting the area!",
        effects: FactorMap::new(0.0, -0.5, 0.0),
    },
    EventTemplate {
        description: "Agricultural runoff detected!",
        effects: FactorMap::new(0.0, 0.3, 0.0),
    },
    EventTemplate {
        description: "Heavy rainfall reducing salinity!",
        effects: FactorMap::new(0.0, 0.0, -2.0),
    },
    EventTemplate {
        description: "Increased evaporation!",
        effects: FactorMap::new(0.0, 0.0, 2.0),
    },
];

/// The fixed pool events are drawn from
pub fn event_pool() -> &'static [EventTemplate] {
    &EVENT_POOL
}

/// A concrete event instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub description: String,
    /// Factor change per second while active
    pub effects: FactorMap<f32>,
    pub duration: f32,
    pub time_remaining: f32,
    /// Minimum quiet time after this event ends
    pub cooldown: f32,
}

impl Event {
    pub fn new(
        description: impl Into<String>,
        effects: FactorMap<f32>,
        duration: f32,
        cooldown: f32,
    ) -> Self {
        Self {
            description: description.into(),
            effects,
            duration,
            time_remaining: duration,
            cooldown,
        }
    }

    /// Instantiate a template with effect magnitudes scaled by `scale`
    pub fn from_template(
        template: &EventTemplate,
        scale: f32,
        duration: f32,
        cooldown: f32,
    ) -> Self {
        Self::new(
            template.description,
            template.effects.map(|_, &delta| delta * scale),
            duration,
            cooldown,
        )
    }

    pub fn warning_message(&self) -> String {
        format!("WARNING: {}", self.description)
    }

    /// Factors this event pushes
    pub fn affected_factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.effects
            .iter()
            .filter(|(_, delta)| **delta != 0.0)
            .map(|(factor, _)| factor)
    }
}

/// Phased event scheduler
#[derive(Debug, Clone)]
pub struct EventScheduler {
    config: EventConfig,
    phase: EventPhase,
    /// Time accumulated toward the next event (Idle and Warning only)
    event_timer: f32,
    /// Current gap between activations
    interval: f32,
    cooldown_timer: f32,
    pending: Option<Event>,
    active: Option<Event>,
    difficulty_multiplier: f32,
    events_handled: u32,
    rng: Pcg32,
}

impl EventScheduler {
    pub fn new(config: EventConfig, seed: u64) -> Self {
        let mut scheduler = Self {
            config,
            phase: EventPhase::Idle,
            event_timer: 0.0,
            interval: 0.0,
            cooldown_timer: 0.0,
            pending: None,
            active: None,
            difficulty_multiplier: 1.0,
            events_handled: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        scheduler.interval = scheduler.draw_interval();
        scheduler
    }

    /// Advance the phase machine by `dt` seconds of event time
    ///
    /// Transitions whose thresholds are already met cascade within the same
    /// call, so a zero-length tick never changes state.
    pub fn tick(&mut self, dt: f32) -> Vec<EventTransition> {
        let mut transitions = Vec::new();

        // dt is consumed by the phase current at entry; cascaded phases see 0
        let mut step = dt;
        loop {
            let before = self.phase;
            match self.phase {
                EventPhase::Idle => {
                    if !self.config.enabled {
                        break;
                    }
                    self.event_timer += step;
                    if self.event_timer >= self.interval - self.config.warning_time {
                        if let Some(message) = self.begin_warning() {
                            transitions.push(EventTransition::Warned(message));
                        }
                    }
                }
                EventPhase::Warning => {
                    self.event_timer += step;
                    if self.event_timer >= self.interval {
                        self.activate_pending();
                        transitions.push(EventTransition::Activated);
                    }
                }
                EventPhase::Active => {
                    let finished = match self.active.as_mut() {
                        Some(event) => {
                            event.time_remaining -= step;
                            event.time_remaining <= 0.0
                        }
                        None => true,
                    };
                    if finished {
                        self.finish_active();
                        transitions.push(EventTransition::Ended);
                    }
                }
                EventPhase::Cooldown => {
                    self.cooldown_timer -= step;
                    if self.cooldown_timer <= 0.0 {
                        self.cooldown_timer = 0.0;
                        self.phase = EventPhase::Idle;
                        transitions.push(EventTransition::Ready);
                    }
                }
            }
            step = 0.0;
            if self.phase == before {
                break;
            }
        }
        transitions
    }

    /// Rescale future interval draws, the minimum gap and effect magnitudes.
    /// Pending and active events keep the values they were created with.
    pub fn adjust_difficulty(&mut self, multiplier: f32) {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            log::warn!("Ignoring invalid difficulty multiplier {multiplier}");
            return;
        }
        self.difficulty_multiplier = multiplier;
        let (lo, hi) = self.interval_bounds();
        log::debug!(
            "Event difficulty x{:.2}: interval {:.1}-{:.1}s, min gap {:.1}s",
            multiplier,
            lo,
            hi,
            self.min_gap()
        );
    }

    /// Put a template straight into Warning (debug/testing)
    pub fn force_warning(&mut self, template: &EventTemplate) {
        self.active = None;
        self.cooldown_timer = 0.0;
        let event = self.instantiate(template);
        self.pending = Some(event);
        self.phase = EventPhase::Warning;
        self.event_timer = self.event_timer.max(self.interval - self.config.warning_time);
    }

    /// Make `event` the active event immediately (debug/testing)
    pub fn force_active(&mut self, event: Event) {
        self.pending = None;
        self.cooldown_timer = 0.0;
        self.start_event(event);
    }

    /// End the active event early, entering cooldown. Returns the cancelled event.
    pub fn cancel_active(&mut self) -> Option<Event> {
        if self.phase != EventPhase::Active {
            return None;
        }
        let event = self.active.take()?;
        self.enter_cooldown(event.cooldown.max(self.min_gap()));
        log::debug!("Event cancelled: {}", event.description);
        Some(event)
    }

    /// Per-second factor deltas of the active event (zero when none)
    pub fn current_effects(&self) -> FactorMap<f32> {
        match (&self.phase, &self.active) {
            (EventPhase::Active, Some(event)) => event.effects,
            _ => FactorMap::splat(0.0),
        }
    }

    pub fn warning_message(&self) -> Option<String> {
        match (&self.phase, &self.pending) {
            (EventPhase::Warning, Some(event)) => Some(event.warning_message()),
            _ => None,
        }
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<&Event> {
        self.pending.as_ref()
    }

    pub fn active(&self) -> Option<&Event> {
        self.active.as_ref()
    }

    pub fn events_handled(&self) -> u32 {
        self.events_handled
    }

    pub fn event_timer(&self) -> f32 {
        self.event_timer
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown_timer
    }

    pub fn difficulty_multiplier(&self) -> f32 {
        self.difficulty_multiplier
    }

    /// Range the next interval is drawn from
    pub fn interval_bounds(&self) -> (f32, f32) {
        (
            self.config.interval_min / self.difficulty_multiplier,
            self.config.interval_max / self.difficulty_multiplier,
        )
    }

    /// Minimum quiet time enforced after an event
    pub fn min_gap(&self) -> f32 {
        self.config.min_gap / self.difficulty_multiplier
    }

    fn begin_warning(&mut self) -> Option<String> {
        let template = EVENT_POOL.choose(&mut self.rng)?;
        let event = self.instantiate(template);
        let message = event.warning_message();
        log::debug!("{}", message);
        self.pending = Some(event);
        self.phase = EventPhase::Warning;
        Some(message)
    }

    fn activate_pending(&mut self) {
        match self.pending.take() {
            Some(event) => self.start_event(event),
            None => {
                // Nothing announced: start counting again
                self.event_timer = 0.0;
                self.interval = self.draw_interval();
                self.phase = EventPhase::Idle;
            }
        }
    }

    fn start_event(&mut self, event: Event) {
        log::info!(
            "Event active: {} ({:.1}s)",
            event.description,
            event.time_remaining
        );
        self.active = Some(event);
        self.events_handled += 1;
        self.event_timer = 0.0;
        self.interval = self.draw_interval();
        self.phase = EventPhase::Active;
    }

    fn finish_active(&mut self) {
        let cooldown = self
            .active
            .take()
            .map(|event| {
                log::info!("Event over: {}", event.description);
                event.cooldown
            })
            .unwrap_or(0.0);
        self.enter_cooldown(cooldown.max(self.min_gap()));
    }

    fn enter_cooldown(&mut self, duration: f32) {
        // Re-entry keeps whichever timer is longer
        self.cooldown_timer = if self.phase == EventPhase::Cooldown {
            self.cooldown_timer.max(duration)
        } else {
            duration
        };
        self.phase = EventPhase::Cooldown;
    }

    fn instantiate(&mut self, template: &EventTemplate) -> Event {
        let (lo, hi) = (self.config.duration_min, self.config.duration_max);
        let duration = if hi > lo { self.rng.random_range(lo..=hi) } else { lo };
        Event::from_template(
            template,
            self.difficulty_multiplier,
            duration,
            self.config.cooldown,
        )
    }

    fn draw_interval(&mut self) -> f32 {
        let (lo, hi) = self.interval_bounds();
        if hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> EventScheduler {
        EventScheduler::new(EventConfig::default(), 42)
    }

    /// Tick in small steps until `phase` is reached (or give up)
    fn run_until(s: &mut EventScheduler, phase: EventPhase) -> f32 {
        let mut t = 0.0;
        while s.phase() != phase && t < 200.0 {
            s.tick(0.1);
            t += 0.1;
        }
        t
    }

    #[test]
    fn test_initial_interval_in_range() {
        let s = scheduler();
        assert_eq!(s.phase(), EventPhase::Idle);
        assert!((15.0..=20.0).contains(&s.interval()));
    }

    #[test]
    fn test_warning_has_no_effect() {
        let mut s = scheduler();
        run_until(&mut s, EventPhase::Warning);
        assert_eq!(s.phase(), EventPhase::Warning);
        assert!(s.event_timer() >= s.interval() - 5.0);
        assert!(s.pending().is_some());
        assert!(s.active().is_none());
        assert!(s.warning_message().unwrap().starts_with("WARNING: "));
        assert_eq!(s.current_effects(), FactorMap::splat(0.0));
    }

    #[test]
    fn test_full_cycle() {
        let mut s = scheduler();
        run_until(&mut s, EventPhase::Active);
        assert_eq!(s.events_handled(), 1);
        assert!(s.pending().is_none());
        assert_eq!(s.event_timer(), 0.0);
        assert!((15.0..=20.0).contains(&s.interval()));
        let event = s.active().unwrap().clone();
        assert!((5.0..=8.0).contains(&event.duration));
        assert_ne!(s.current_effects(), FactorMap::splat(0.0));

        run_until(&mut s, EventPhase::Cooldown);
        assert!(s.active().is_none());
        assert!(s.cooldown_timer() <= 10.0 && s.cooldown_timer() > 9.0);

        let waited = run_until(&mut s, EventPhase::Idle);
        assert!(waited >= 9.8, "cooldown too short: {waited}");
        assert_eq!(s.event_timer(), 0.0);
    }

    #[test]
    fn test_disabled_stays_idle() {
        let config = EventConfig {
            enabled: false,
            ..EventConfig::default()
        };
        let mut s = EventScheduler::new(config, 1);
        for _ in 0..100 {
            assert!(s.tick(1.0).is_empty());
        }
        assert_eq!(s.phase(), EventPhase::Idle);
        assert_eq!(s.events_handled(), 0);
    }

    #[test]
    fn test_large_dt_cascades_to_active() {
        let mut s = scheduler();
        let transitions = s.tick(30.0);
        let description = s.active().unwrap().description.clone();
        assert_eq!(
            transitions,
            vec![
                EventTransition::Warned(format!("WARNING: {description}")),
                EventTransition::Activated
            ]
        );
        assert_eq!(s.phase(), EventPhase::Active);
        assert!(s.warning_message().is_none());
    }

    #[test]
    fn test_cooldown_reentry_keeps_longer_timer() {
        let mut s = scheduler();
        s.phase = EventPhase::Cooldown;
        s.cooldown_timer = 25.0;
        s.enter_cooldown(10.0);
        assert_eq!(s.phase(), EventPhase::Cooldown);
        assert_eq!(s.cooldown_timer(), 25.0);

        s.enter_cooldown(40.0);
        assert_eq!(s.cooldown_timer(), 40.0);

        // Fresh entry takes the given duration
        let mut fresh = scheduler();
        fresh.enter_cooldown(3.0);
        assert_eq!(fresh.cooldown_timer(), 3.0);
    }

    #[test]
    fn test_zero_tick_changes_nothing() {
        let mut s = scheduler();
        s.tick(12.0);
        let phase = s.phase();
        let timer = s.event_timer();
        let pending = s.pending().cloned();
        for _ in 0..10 {
            assert!(s.tick(0.0).is_empty());
        }
        assert_eq!(s.phase(), phase);
        assert_eq!(s.event_timer(), timer);
        assert_eq!(s.pending().cloned(), pending);
    }

    #[test]
    fn test_interval_bounds_shrink_with_difficulty() {
        let mut s = scheduler();
        let mut last = s.interval_bounds();
        let mut last_gap = s.min_gap();
        for round in 2..=10 {
            s.adjust_difficulty(1.0 + (round - 1) as f32 * 0.1);
            let bounds = s.interval_bounds();
            assert!(bounds.0 < last.0 && bounds.1 < last.1);
            assert!(s.min_gap() < last_gap);
            last = bounds;
            last_gap = s.min_gap();
        }
    }

    #[test]
    fn test_difficulty_not_retroactive() {
        let mut s = scheduler();
        s.force_warning(&event_pool()[0]);
        let pending_before = s.pending().unwrap().effects;
        s.adjust_difficulty(2.0);
        assert_eq!(s.pending().unwrap().effects, pending_before);
        assert_eq!(pending_before[Factor::Temperature], 3.0);

        // Next generated event is scaled
        s.force_warning(&event_pool()[0]);
        assert_eq!(s.pending().unwrap().effects[Factor::Temperature], 6.0);
    }

    #[test]
    fn test_invalid_multiplier_ignored() {
        let mut s = scheduler();
        s.adjust_difficulty(0.0);
        s.adjust_difficulty(f32::NAN);
        assert_eq!(s.difficulty_multiplier(), 1.0);
    }

    #[test]
    fn test_force_active_and_cancel() {
        let mut s = scheduler();
        s.force_active(Event::new("Test", FactorMap::new(3.0, 0.0, 0.0), 5.0, 2.0));
        assert_eq!(s.phase(), EventPhase::Active);
        assert_eq!(s.current_effects()[Factor::Temperature], 3.0);

        let cancelled = s.cancel_active().unwrap();
        assert_eq!(cancelled.description, "Test");
        assert_eq!(s.phase(), EventPhase::Cooldown);
        // max(event cooldown 2s, min gap 10s)
        assert_eq!(s.cooldown_timer(), 10.0);
        assert!(s.cancel_active().is_none());
    }

    #[test]
    fn test_determinism() {
        let mut a = EventScheduler::new(EventConfig::default(), 7);
        let mut b = EventScheduler::new(EventConfig::default(), 7);
        for _ in 0..2000 {
            a.tick(0.05);
            b.tick(0.05);
        }
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.events_handled(), b.events_handled());
        assert_eq!(a.active().cloned(), b.active().cloned());
        assert_eq!(a.interval(), b.interval());
    }

    #[test]
    fn test_pool_each_touches_one_factor() {
        for template in event_pool() {
            let event = Event::from_template(template, 1.0, 5.0, 10.0);
            assert_eq!(event.affected_factors().count(), 1);
        }
    }
}
