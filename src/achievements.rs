//! Achievements unlocked during a run

use serde::{Deserialize, Serialize};

use crate::consts::{HEALTHY_THRESHOLD, STRESSED_THRESHOLD};

/// Seconds of continuous perfect balance for [`Achievement::PerfectBalance`]
pub const PERFECT_BALANCE_SECONDS: f32 = 30.0;
/// Events handled for [`Achievement::EventMaster`]
pub const EVENT_MASTER_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    PerfectBalance,
    QuickRecovery,
    EventMaster,
}

impl Achievement {
    pub const ALL: [Achievement; 3] = [
        Achievement::PerfectBalance,
        Achievement::QuickRecovery,
        Achievement::EventMaster,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::PerfectBalance => "Perfect Balance",
            Achievement::QuickRecovery => "Quick Recovery",
            Achievement::EventMaster => "Event Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::PerfectBalance => "Maintain optimal conditions for 30 seconds",
            Achievement::QuickRecovery => "Restore reef health from below 30% to above 70%",
            Achievement::EventMaster => "Successfully handle 5 events",
        }
    }

    fn slot(self) -> usize {
        match self {
            Achievement::PerfectBalance => 0,
            Achievement::QuickRecovery => 1,
            Achievement::EventMaster => 2,
        }
    }
}

/// What the tracker looks at each tick
#[derive(Debug, Clone, Copy)]
pub struct AchievementInput {
    /// All factors inside their perfect-balance band
    pub balanced: bool,
    pub health: f32,
    pub events_handled: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Achievements {
    unlocked: [bool; 3],
    balanced_time: f32,
    was_critical: bool,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update progress; returns achievements unlocked by this call
    pub fn update(&mut self, dt: f32, input: AchievementInput) -> Vec<Achievement> {
        if input.balanced {
            self.balanced_time += dt;
        } else {
            self.balanced_time = 0.0;
        }
        if input.health < STRESSED_THRESHOLD {
            self.was_critical = true;
        }

        let mut newly = Vec::new();
        if self.balanced_time >= PERFECT_BALANCE_SECONDS {
            self.unlock(Achievement::PerfectBalance, &mut newly);
        }
        if self.was_critical && input.health > HEALTHY_THRESHOLD {
            self.unlock(Achievement::QuickRecovery, &mut newly);
        }
        if input.events_handled >= EVENT_MASTER_COUNT {
            self.unlock(Achievement::EventMaster, &mut newly);
        }
        newly
    }

    fn unlock(&mut self, achievement: Achievement, newly: &mut Vec<Achievement>) {
        let slot = &mut self.unlocked[achievement.slot()];
        if !*slot {
            *slot = true;
            log::info!("Achievement unlocked: {}", achievement.name());
            newly.push(achievement);
        }
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked[achievement.slot()]
    }

    pub fn unlocked(&self) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|a| self.is_unlocked(*a))
            .collect()
    }

    pub fn balanced_time(&self) -> f32 {
        self.balanced_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(balanced: bool, health: f32, events_handled: u32) -> AchievementInput {
        AchievementInput {
            balanced,
            health,
            events_handled,
        }
    }

    #[test]
    fn test_perfect_balance_needs_continuous_time() {
        let mut a = Achievements::new();
        assert!(a.update(20.0, input(true, 100.0, 0)).is_empty());
        a.update(1.0, input(false, 100.0, 0));
        assert!(a.update(20.0, input(true, 100.0, 0)).is_empty());
        let newly = a.update(10.0, input(true, 100.0, 0));
        assert_eq!(newly, vec![Achievement::PerfectBalance]);
        // Only once
        assert!(a.update(10.0, input(true, 100.0, 0)).is_empty());
    }

    #[test]
    fn test_quick_recovery() {
        let mut a = Achievements::new();
        assert!(a.update(1.0, input(false, 80.0, 0)).is_empty());
        a.update(1.0, input(false, 25.0, 0));
        assert!(a.update(1.0, input(false, 60.0, 0)).is_empty());
        assert_eq!(
            a.update(1.0, input(false, 71.0, 0)),
            vec![Achievement::QuickRecovery]
        );
    }

    #[test]
    fn test_event_master() {
        let mut a = Achievements::new();
        assert!(a.update(1.0, input(false, 50.0, 4)).is_empty());
        assert_eq!(
            a.update(1.0, input(false, 50.0, 5)),
            vec![Achievement::EventMaster]
        );
        assert_eq!(a.unlocked(), vec![Achievement::EventMaster]);
    }
}
