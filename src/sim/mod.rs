//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied dt only (no wall clock)
//! - Seeded RNG only
//! - Closed factor set, fixed-size per-factor tables
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod control;
pub mod events;
pub mod factor;
pub mod game;
pub mod gate;
pub mod powerups;
pub mod round;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use control::{ControlOwnership, Owner};
pub use events::{Event, EventPhase, EventScheduler, EventTemplate, event_pool};
pub use factor::{Factor, FactorMap, FactorSpec};
pub use game::{GameEvent, GameManager, GamePhase, GameSummary, performance_tip};
pub use gate::PlayerActionGate;
pub use powerups::{PowerUpKind, PowerUps};
pub use round::Round;
pub use snapshot::{ActiveEventView, FactorView, RoundView, Snapshot};
pub use state::{EnvironmentalState, HealthState};
