use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Difficulty, NewUserAnswer, QuizSession, SessionStatus},
        dto::{
            request::SubmitAnswerRequest,
            response::{FinishSummary, QuestionView, QuizProgress},
        },
    },
    repositories::{QuestionRepository, QuizSessionRepository},
};

/// Drives a quiz session from `playing` to `finished`.
///
/// The nth question of a session is the nth question of its tier in id
/// order, so the session only has to remember an index.
pub struct QuizSessionService {
    sessions: Arc<dyn QuizSessionRepository>,
    questions: Arc<dyn QuestionRepository>,
    reveal_answers: bool,
}

fn no_active_session() -> AppError {
    AppError::NotFound("No active quiz session".to_string())
}

impl QuizSessionService {
    pub fn new(
        sessions: Arc<dyn QuizSessionRepository>,
        questions: Arc<dyn QuestionRepository>,
        reveal_answers: bool,
    ) -> Self {
        Self {
            sessions,
            questions,
            reveal_answers,
        }
    }

    pub async fn start(&self, user_id: i64, difficulty: &str) -> AppResult<QuizProgress> {
        let difficulty: Difficulty = difficulty.parse()?;

        let first = self
            .questions
            .find_nth_by_difficulty(difficulty, 0)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No questions available for difficulty {}", difficulty))
            })?;

        let session = self.sessions.create(user_id, difficulty).await?;
        log::info!(
            "User {} started quiz session {} ({})",
            user_id,
            session.id,
            difficulty
        );

        Ok(QuizProgress::new(
            &session,
            Some(QuestionView::new(first, self.reveal_answers)),
        ))
    }

    pub async fn get_progress(&self, user_id: i64) -> AppResult<QuizProgress> {
        let session = self.active_session(user_id).await?;
        let current_question = self.question_at(&session).await?;
        let answers = self.sessions.find_answers(session.id).await?;

        Ok(QuizProgress::new(&session, current_question).with_answers(answers))
    }

    /// Scores an answer against the referenced question and moves the session
    /// forward. When no question is left the response reports `finished`, but
    /// the stored session stays `playing` until [`Self::finish`].
    pub async fn submit_answer(
        &self,
        user_id: i64,
        request: SubmitAnswerRequest,
    ) -> AppResult<QuizProgress> {
        request.validate()?;

        let mut session = self.active_session(user_id).await?;

        let question = self
            .questions
            .find_by_id(request.question_id)
            .await?
            .ok_or_else(|| AppError::ValidationError("Invalid question ID".to_string()))?;

        let answer = NewUserAnswer::snapshot(session.id, &question, &request.answer)?;
        let correct = answer.is_correct;
        session.advance(correct);

        self.sessions.record_answer(session.clone(), answer).await?;
        log::debug!(
            "Session {} answered question {} ({})",
            session.id,
            question.id,
            if correct { "correct" } else { "wrong" }
        );

        let next = self.question_at(&session).await?;
        let mut progress = QuizProgress::new(&session, next);
        if progress.current_question.is_none() {
            progress.status = SessionStatus::Finished;
        }
        Ok(progress)
    }

    pub async fn finish(&self, user_id: i64) -> AppResult<FinishSummary> {
        let mut session = self.active_session(user_id).await?;
        session.finish(Utc::now());

        let high_score = self.sessions.finish(session.clone()).await?;
        log::info!(
            "User {} finished quiz session {} with score {} (best {} in {})",
            user_id,
            session.id,
            session.score,
            high_score.score,
            session.difficulty
        );

        Ok(FinishSummary {
            message: "Quiz finished successfully".to_string(),
            final_score: session.score,
            difficulty: session.difficulty,
            high_score: high_score.score,
        })
    }

    async fn active_session(&self, user_id: i64) -> AppResult<QuizSession> {
        self.sessions
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(no_active_session)
    }

    async fn question_at(&self, session: &QuizSession) -> AppResult<Option<QuestionView>> {
        let question = self
            .questions
            .find_nth_by_difficulty(session.difficulty, i64::from(session.current_question_index))
            .await?;
        Ok(question.map(|q| QuestionView::new(q, self.reveal_answers)))
    }
}
