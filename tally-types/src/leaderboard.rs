use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

/// Per-user statistics recomputed from the full result set on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub games_played: u32,
    pub wins: u32,
    pub failures: u32,
    pub g1: u32,
    pub g2: u32,
    pub g3: u32,
    pub g4: u32,
    pub g5: u32,
    pub g6: u32,
    pub avg_guesses: Option<f64>,
    pub std_dev: Option<f64>,
    pub total: i64,
    pub weighted_avg: f64,
}

impl LeaderboardRow {
    pub fn empty(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            games_played: 0,
            wins: 0,
            failures: 0,
            g1: 0,
            g2: 0,
            g3: 0,
            g4: 0,
            g5: 0,
            g6: 0,
            avg_guesses: None,
            std_dev: None,
            total: 0,
            weighted_avg: 0.0,
        }
    }

    /// Win counts indexed by guess count minus one
    pub fn guess_distribution(&self) -> [u32; 6] {
        [self.g1, self.g2, self.g3, self.g4, self.g5, self.g6]
    }

    /// Mutable slot for the win count at `guesses`, if it is in 1..=6
    pub fn guess_bucket_mut(&mut self, guesses: u8) -> Option<&mut u32> {
        match guesses {
            1 => Some(&mut self.g1),
            2 => Some(&mut self.g2),
            3 => Some(&mut self.g3),
            4 => Some(&mut self.g4),
            5 => Some(&mut self.g5),
            6 => Some(&mut self.g6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RankedRow {
    pub rank: u32,
    pub row: LeaderboardRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStats {
    pub row: LeaderboardRow,
    pub rank: Option<u32>,
}
