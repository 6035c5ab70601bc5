use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    Difficulty, HighScore, LeaderboardEntry, Question, QuizSession, SessionStatus, User,
    UserAnswer, UserRole,
};

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: UserDto,
    pub high_scores: Vec<HighScore>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub difficulty: Difficulty,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Question as shown to a player mid-quiz. The answer key and reference are
/// only present when answers are configured to be revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl QuestionView {
    pub fn new(question: Question, reveal_answers: bool) -> Self {
        let (correct_answer_index, reference) = if reveal_answers {
            (Some(question.correct_answer_index), Some(question.reference))
        } else {
            (None, None)
        };

        QuestionView {
            id: question.id,
            question_text: question.question_text,
            options: question.options,
            difficulty: question.difficulty,
            correct_answer_index,
            reference,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizProgress {
    pub session_id: i64,
    pub difficulty: Difficulty,
    pub current_question_index: i32,
    pub score: i32,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_answers: Vec<UserAnswer>,
}

impl QuizProgress {
    pub fn new(session: &QuizSession, current_question: Option<QuestionView>) -> Self {
        QuizProgress {
            session_id: session.id,
            difficulty: session.difficulty,
            current_question_index: session.current_question_index,
            score: session.score,
            status: session.status,
            current_question,
            user_answers: Vec::new(),
        }
    }

    pub fn with_answers(mut self, user_answers: Vec<UserAnswer>) -> Self {
        self.user_answers = user_answers;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishSummary {
    pub message: String,
    pub final_score: i32,
    pub difficulty: Difficulty,
    pub high_score: i32,
}
