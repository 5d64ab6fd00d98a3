//! High score leaderboard
//!
//! Top 10 runs by difficulty-weighted score, optionally kept in a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::sim::GameSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Leaderboard file failure
#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("Cannot access leaderboard {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid leaderboard JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Difficulty-weighted score
    pub score: u64,
    pub rounds_completed: u32,
    pub difficulty: Difficulty,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run. Returns the rank achieved or None if it didn't qualify.
    /// Equal scores rank after existing entries.
    pub fn add_score(
        &mut self,
        score: u64,
        rounds_completed: u32,
        difficulty: Difficulty,
        timestamp: u64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            rounds_completed,
            difficulty,
            timestamp,
        };

        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("New high score {} at rank {}", score, rank);
        Some(rank)
    }

    /// Record a finished run from its summary
    pub fn record(&mut self, summary: &GameSummary, timestamp: u64) -> Option<usize> {
        self.add_score(
            summary.leaderboard_score,
            summary.rounds_completed,
            summary.difficulty,
            timestamp,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file. A missing file is an empty board.
    pub fn load(path: &Path) -> Result<Self, HighScoreError> {
        if !path.exists() {
            log::info!("No high scores at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| HighScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scores: HighScores =
            serde_json::from_str(&content).map_err(|source| HighScoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), HighScoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| HighScoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| HighScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load the board at `path`, record the run and write it back.
    /// An unreadable board is left untouched on disk.
    pub fn record_to_file(
        path: &Path,
        summary: &GameSummary,
        timestamp: u64,
    ) -> Result<(Self, Option<usize>), HighScoreError> {
        let mut scores = Self::load(path)?;
        let rank = scores.record(summary, timestamp);
        scores.save(path)?;
        Ok((scores, rank))
    }
}

/// Relative age of an entry, e.g. "3 days ago"
pub fn format_age(now: u64, timestamp: u64) -> String {
    let secs = now.saturating_sub(timestamp);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[u64]) -> HighScores {
        let mut hs = HighScores::new();
        for &s in scores {
            hs.add_score(s, 3, Difficulty::Normal, 0);
        }
        hs
    }

    #[test]
    fn test_sorted_descending() {
        let hs = board(&[300, 900, 500]);
        let scores: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![900, 500, 300]);
        assert_eq!(hs.top_score(), Some(900));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut hs = HighScores::new();
        assert!(!hs.qualifies(0));
        assert_eq!(hs.add_score(0, 0, Difficulty::Easy, 0), None);
        assert!(hs.is_empty());
    }

    #[test]
    fn test_full_board() {
        let mut hs = board(&[100, 200, 300, 400, 500, 600, 700, 800, 900, 1000]);
        assert!(!hs.qualifies(100));
        assert_eq!(hs.potential_rank(550), Some(6));
        assert_eq!(hs.add_score(550, 5, Difficulty::Hard, 1), Some(6));
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.entries.last().map(|e| e.score), Some(200));
    }

    #[test]
    fn test_ties_rank_after() {
        let mut hs = board(&[500]);
        assert_eq!(hs.add_score(500, 1, Difficulty::Easy, 0), Some(2));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("reef-hs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");

        assert!(HighScores::load(&path).unwrap().is_empty());
        let hs = board(&[120, 80]);
        hs.save(&path).unwrap();
        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.entries, hs.entries);

        std::fs::remove_dir_all(&dir).ok();
    }

    fn summary(leaderboard_score: u64) -> GameSummary {
        GameSummary {
            score: leaderboard_score,
            rounds_completed: 2,
            total_rounds: 10,
            elapsed_time: 120.0,
            final_health: 90.0,
            difficulty: Difficulty::Normal,
            leaderboard_score,
            tip: "",
            achievements: Vec::new(),
        }
    }

    #[test]
    fn test_record_to_file() {
        let dir = std::env::temp_dir().join(format!("reef-hs-rec-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");

        let (_, rank) = HighScores::record_to_file(&path, &summary(150), 10).unwrap();
        assert_eq!(rank, Some(1));
        let (scores, rank) = HighScores::record_to_file(&path, &summary(300), 20).unwrap();
        assert_eq!(rank, Some(1));
        assert_eq!(HighScores::load(&path).unwrap().entries, scores.entries);
        assert_eq!(scores.entries.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_left_alone() {
        let dir = std::env::temp_dir().join(format!("reef-hs-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");
        std::fs::write(&path, "{ corrupt").unwrap();

        let err = HighScores::record_to_file(&path, &summary(500), 1).unwrap_err();
        assert!(matches!(err, HighScoreError::Parse { .. }));
        assert!(err.to_string().contains("leaderboard"), "{err}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ corrupt");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(100, 90), "Just now");
        assert_eq!(format_age(3600 * 5, 0), "5 hours ago");
        assert_eq!(format_age(86_400 + 10, 0), "Yesterday");
        assert_eq!(format_age(0, 50), "Just now");
    }
}
