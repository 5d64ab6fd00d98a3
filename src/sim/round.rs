//! Round controller
//!
//! A round is a fixed-length timed segment. Each later round is harder:
//! round N runs at difficulty `1 + (N - 1) * step`.

use serde::{Deserialize, Serialize};

use crate::config::RoundConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number
    pub index: u32,
    pub total: u32,
    pub duration: f32,
    pub time_remaining: f32,
    pub difficulty_multiplier: f32,
    difficulty_step: f32,
}

impl Round {
    /// Round 1 of a new game
    pub fn first(config: &RoundConfig) -> Self {
        Self::numbered(1, config)
    }

    pub fn numbered(index: u32, config: &RoundConfig) -> Self {
        Self {
            index,
            total: config.total,
            duration: config.duration,
            time_remaining: config.duration,
            difficulty_multiplier: difficulty_for_round(index, config.difficulty_step),
            difficulty_step: config.difficulty_step,
        }
    }

    /// Move to the following round with a full timer
    pub fn advance(&mut self) {
        self.index += 1;
        self.time_remaining = self.duration;
        self.difficulty_multiplier = difficulty_for_round(self.index, self.difficulty_step);
    }

    /// Count down; returns true once the round timer has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        self.time_remaining -= dt;
        self.is_over()
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.time_remaining <= 0.0
    }

    pub fn is_final(&self) -> bool {
        self.index >= self.total
    }

    /// Fraction of the round already played (0..=1)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.time_remaining / self.duration).clamp(0.0, 1.0)
    }
}

/// Difficulty multiplier for a 1-based round number
pub fn difficulty_for_round(index: u32, step: f32) -> f32 {
    1.0 + index.saturating_sub(1) as f32 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_formula() {
        let config = RoundConfig::default();
        let mut round = Round::first(&config);
        assert_eq!(round.difficulty_multiplier, 1.0);
        for n in 2..=10u32 {
            round.advance();
            assert_eq!(round.index, n);
            let expected = 1.0 + (n - 1) as f32 * 0.1;
            assert!((round.difficulty_multiplier - expected).abs() < 1e-6);
        }
        assert!(round.is_final());
    }

    #[test]
    fn test_timer() {
        let config = RoundConfig {
            total: 2,
            duration: 1.0,
            difficulty_step: 0.1,
        };
        let mut round = Round::first(&config);
        assert!(!round.tick(0.5));
        assert!((round.progress() - 0.5).abs() < 1e-6);
        assert!(round.tick(0.6));
        assert!(!round.is_final());
        round.advance();
        assert_eq!(round.time_remaining, 1.0);
        assert!(round.is_final());
    }
}
