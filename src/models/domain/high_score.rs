use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HighScore {
    pub id: i64,
    pub user_id: i64,
    pub difficulty: Difficulty,
    pub score: i32,
    pub updated_at: DateTime<Utc>,
}

impl HighScore {
    /// Applies a finished session's score: the score never decreases, the
    /// timestamp always moves to `finished_at`.
    pub fn record(&mut self, session_score: i32, finished_at: DateTime<Utc>) {
        self.score = self.score.max(session_score);
        self.updated_at = finished_at;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub difficulty: Difficulty,
    pub score: i32,
    pub updated_at: DateTime<Utc>,
}
