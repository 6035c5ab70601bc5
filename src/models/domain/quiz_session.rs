use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, models::domain::Difficulty};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Playing,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Playing => "playing",
            SessionStatus::Finished => "finished",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playing" => Ok(SessionStatus::Playing),
            "finished" => Ok(SessionStatus::Finished),
            other => Err(AppError::InternalError(format!(
                "Unknown quiz session status '{}'",
                other
            ))),
        }
    }
}

/// One playthrough of a difficulty tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizSession {
    pub id: i64,
    pub user_id: i64,
    pub difficulty: Difficulty,
    pub current_question_index: i32,
    pub score: i32,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    /// Moves to the next question, adding a point for a correct answer.
    /// The session stays `playing` even when no question is left.
    pub fn advance(&mut self, correct: bool) {
        self.current_question_index += 1;
        if correct {
            self.score += 1;
        }
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.status = SessionStatus::Finished;
        self.finished_at = Some(at);
    }
}

#[cfg(test)]
impl QuizSession {
    pub fn test_session(id: i64, user_id: i64, difficulty: Difficulty) -> Self {
        QuizSession {
            id,
            user_id,
            difficulty,
            current_question_index: 0,
            score: 0,
            status: SessionStatus::Playing,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}
