//! Game manager: the top-level state machine
//!
//! ```text
//! Menu --start_game--> Playing --round timer--> RoundEnd --start_next_round--> Playing
//!                        |
//!                        +--health <= 0 or final round over--> GameOver --start_game--> Playing
//! ```
//!
//! The manager is the single owner of every simulation part. Presentation code
//! pushes actions through [`GameManager::handle_player_action`], advances time
//! with [`GameManager::tick`] and reads [`GameManager::snapshot`].

use serde::{Deserialize, Serialize};

use super::control::ControlOwnership;
use super::events::{Event, EventScheduler, EventTemplate};
use super::factor::{Factor, FactorMap};
use super::gate::PlayerActionGate;
use super::powerups::{PowerUpKind, PowerUps};
use super::round::Round;
use super::state::EnvironmentalState;
use crate::achievements::{Achievement, Achievements};
use crate::config::SimConfig;
use crate::difficulty::{Difficulty, DifficultyPreset};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No simulation running
    Menu,
    /// Active gameplay
    Playing,
    /// Between rounds; simulation frozen, summary available
    RoundEnd,
    /// Run ended (reef lost or all rounds played)
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::RoundEnd => "round_end",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// Notifications for presentation/audio, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EventWarning(String),
    EventStarted(String),
    EventEnded,
    /// An event was absorbed by the shield power-up
    EventBlocked(String),
    PowerUpOffered(PowerUpKind),
    PowerUpActivated(PowerUpKind),
    AchievementUnlocked(Achievement),
    RoundEnded { round: u32, round_score: u64 },
    GameOver { score: u64 },
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub score: u64,
    pub rounds_completed: u32,
    pub total_rounds: u32,
    pub elapsed_time: f32,
    pub final_health: f32,
    pub difficulty: Difficulty,
    /// Score weighted by difficulty, used for the leaderboard
    pub leaderboard_score: u64,
    pub tip: &'static str,
    pub achievements: Vec<Achievement>,
}

/// Advice shown on the game-over screen, based on time survived
pub fn performance_tip(elapsed_time: f32) -> &'static str {
    if elapsed_time < 30.0 {
        "Tip: Try to keep environmental values close to optimal levels!"
    } else if elapsed_time < 60.0 {
        "Remember: Coral reefs are sensitive to temperature changes!"
    } else {
        "Great job! You're helping protect our coral reefs!"
    }
}

/// Spreads run seeds apart (golden ratio increment)
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Top-level aggregate owning all simulation state
#[derive(Debug, Clone)]
pub struct GameManager {
    pub(super) config: SimConfig,
    pub(super) difficulty: Difficulty,
    pub(super) phase: GamePhase,
    pub(super) env: EnvironmentalState,
    pub(super) gate: PlayerActionGate,
    pub(super) control: ControlOwnership,
    pub(super) scheduler: EventScheduler,
    pub(super) round: Round,
    pub(super) powerups: PowerUps,
    pub(super) achievements: Achievements,
    /// Accepted player targets waiting for the next tick (latest wins)
    pub(super) queued: FactorMap<Option<f32>>,
    pub(super) score: u64,
    pub(super) elapsed_time: f32,
    pub(super) carry_over_health: f32,
    pub(super) rounds_completed: u32,
    pub(super) games_started: u64,
    pub(super) notifications: Vec<GameEvent>,
}

impl GameManager {
    /// Create a manager sitting in the menu
    pub fn new(config: SimConfig) -> Self {
        let specs = config.factors.table();
        let difficulty = config.difficulty;
        let starting_health = difficulty.preset().starting_health;
        Self {
            difficulty,
            phase: GamePhase::Menu,
            env: EnvironmentalState::new(specs, starting_health),
            gate: PlayerActionGate::new(specs),
            control: ControlOwnership::new(config.control.release_window),
            scheduler: EventScheduler::new(config.events, config.seed),
            round: Round::first(&config.rounds),
            powerups: PowerUps::new(config.powerups, config.seed ^ SEED_STRIDE),
            achievements: Achievements::new(),
            queued: FactorMap::splat(None),
            score: 0,
            elapsed_time: 0.0,
            carry_over_health: starting_health,
            rounds_completed: 0,
            games_started: 0,
            notifications: Vec::new(),
            config,
        }
    }

    /// Begin a new run from round 1 (also used for restart)
    pub fn start_game(&mut self) {
        let seed = self
            .config
            .seed
            .wrapping_add(self.games_started.wrapping_mul(SEED_STRIDE));
        self.games_started += 1;

        let specs = self.config.factors.table();
        let starting_health = self.preset().starting_health;

        self.round = Round::first(&self.config.rounds);
        self.env = EnvironmentalState::new(specs, starting_health);
        self.gate.reset();
        self.control.clear();
        self.scheduler = EventScheduler::new(self.config.events, seed);
        self.scheduler.adjust_difficulty(self.round.difficulty_multiplier);
        self.powerups = PowerUps::new(self.config.powerups, seed ^ SEED_STRIDE);
        self.achievements = Achievements::new();
        self.queued = FactorMap::splat(None);
        self.score = 0;
        self.elapsed_time = 0.0;
        self.carry_over_health = starting_health;
        self.rounds_completed = 0;
        self.notifications.clear();
        self.phase = GamePhase::Playing;

        log::info!(
            "Game started: {} rounds x {}s, difficulty {}, seed {}",
            self.round.total,
            self.round.duration,
            self.difficulty.as_str(),
            seed
        );
    }

    /// Score the finished round and move to RoundEnd or GameOver
    pub fn handle_round_end(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let round_score = self.env.health().round().max(0.0) as u64;
        self.score += round_score;
        self.rounds_completed += 1;
        self.notifications.push(GameEvent::RoundEnded {
            round: self.round.index,
            round_score,
        });
        log::info!(
            "Round {}/{} complete: +{} (total {})",
            self.round.index,
            self.round.total,
            round_score,
            self.score
        );

        if self.round.is_final() {
            self.enter_game_over();
        } else {
            self.carry_over_health = self.env.health();
            self.phase = GamePhase::RoundEnd;
        }
    }

    /// Continue from RoundEnd into the next, harder round
    pub fn start_next_round(&mut self) {
        if self.phase != GamePhase::RoundEnd {
            return;
        }
        self.env.set_health(self.carry_over_health);
        self.env.reset_factors();
        self.gate.reset();
        self.control.clear();
        self.queued = FactorMap::splat(None);
        self.round.advance();
        self.scheduler.adjust_difficulty(self.round.difficulty_multiplier);
        self.phase = GamePhase::Playing;

        log::info!(
            "Round {}/{} started (difficulty x{:.1}, health {:.0})",
            self.round.index,
            self.round.total,
            self.round.difficulty_multiplier,
            self.env.health()
        );
    }

    /// Route a player control change: gate, then ownership, then queue for the tick
    pub fn handle_player_action(&mut self, factor: Factor, value: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let accepted = self.gate.submit(factor, value);
        self.control.claim(factor);
        self.queued[factor] = Some(accepted);
    }

    /// Pick a difficulty preset. Ignored mid-round.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.phase == GamePhase::Playing {
            log::debug!("Difficulty change ignored while playing");
            return;
        }
        self.difficulty = difficulty;
        log::info!("Difficulty set to {}", difficulty.as_str());
    }

    /// Take the currently offered power-up
    pub fn activate_power_up(&mut self) -> Option<PowerUpKind> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let kind = self.powerups.activate()?;
        self.notifications.push(GameEvent::PowerUpActivated(kind));
        Some(kind)
    }

    /// Announce an event from the pool immediately (debug)
    pub fn force_warning(&mut self, template: &EventTemplate) {
        self.scheduler.force_warning(template);
    }

    /// Make an event active immediately (debug)
    pub fn force_event(&mut self, event: Event) {
        self.scheduler.force_active(event);
    }

    /// Leave the game (from any phase) back to the menu
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
    }

    /// Take pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.notifications)
    }

    pub fn summary(&self) -> GameSummary {
        let leaderboard_score =
            (self.score as f32 * self.difficulty.score_multiplier()).round() as u64;
        GameSummary {
            score: self.score,
            rounds_completed: self.rounds_completed,
            total_rounds: self.round.total,
            elapsed_time: self.elapsed_time,
            final_health: self.env.health(),
            difficulty: self.difficulty,
            leaderboard_score,
            tip: performance_tip(self.elapsed_time),
            achievements: self.achievements.unlocked(),
        }
    }

    pub(super) fn enter_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.notifications.push(GameEvent::GameOver { score: self.score });
        log::info!(
            "Game over after {:.1}s: score {}, health {:.1}",
            self.elapsed_time,
            self.score,
            self.env.health()
        );
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn preset(&self) -> DifficultyPreset {
        self.difficulty.preset()
    }

    pub fn environment(&self) -> &EnvironmentalState {
        &self.env
    }

    pub fn control(&self) -> &ControlOwnership {
        &self.control
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn powerups(&self) -> &PowerUps {
        &self.powerups
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn health(&self) -> f32 {
        self.env.health()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn carry_over_health(&self) -> f32 {
        self.carry_over_health
    }
}
