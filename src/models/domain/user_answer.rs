use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Question,
};

/// Append-only record of one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserAnswer {
    pub id: i64,
    pub quiz_session_id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub reference: String,
    pub answered_at: DateTime<Utc>,
}

/// Answer about to be stored, with the question's text and key copied in so
/// later edits to the question leave history alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUserAnswer {
    pub quiz_session_id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub reference: String,
}

impl NewUserAnswer {
    pub fn snapshot(quiz_session_id: i64, question: &Question, answer: &str) -> AppResult<Self> {
        let correct_answer = question.correct_answer().ok_or_else(|| {
            AppError::InternalError(format!(
                "Question {} has no option at its correct answer index",
                question.id
            ))
        })?;

        Ok(Self {
            quiz_session_id,
            question_id: question.id,
            question_text: question.question_text.clone(),
            user_answer: answer.to_string(),
            correct_answer: correct_answer.to_string(),
            is_correct: question.is_correct(answer),
            reference: question.reference.clone(),
        })
    }
}
