use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Difficulty, HighScore, NewUserAnswer, QuizSession, UserAnswer},
    repositories::user_repository::HighScoreRow,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    async fn create(&self, user_id: i64, difficulty: Difficulty) -> AppResult<QuizSession>;
    /// Most recently started `playing` session of the user.
    async fn find_active_by_user(&self, user_id: i64) -> AppResult<Option<QuizSession>>;
    /// Answers of a session in the order they were given.
    async fn find_answers(&self, session_id: i64) -> AppResult<Vec<UserAnswer>>;
    /// Stores the answer and moves the stored session one position forward,
    /// adding a point when the answer is correct, in one transaction. Fails
    /// with `NotFound` and stores nothing once the session is not `playing`.
    async fn record_answer(
        &self,
        session: QuizSession,
        answer: NewUserAnswer,
    ) -> AppResult<UserAnswer>;
    /// Closes the already-finished session and folds its score into the
    /// user's high score for the tier, in one transaction.
    async fn finish(&self, session: QuizSession) -> AppResult<HighScore>;
}

pub struct PgQuizSessionRepository {
    pool: PgPool,
}

impl PgQuizSessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuizSessionRow {
    id: i64,
    user_id: i64,
    difficulty: String,
    current_question_index: i32,
    score: i32,
    status: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSessionRow {
    fn into_session(self) -> AppResult<QuizSession> {
        Ok(QuizSession {
            id: self.id,
            user_id: self.user_id,
            difficulty: self.difficulty.parse()?,
            current_question_index: self.current_question_index,
            score: self.score,
            status: self.status.parse()?,
            started_at: self.started_at,
            finished_at: self.finished_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserAnswerRow {
    id: i64,
    quiz_session_id: i64,
    question_id: i64,
    question_text: String,
    user_answer: String,
    correct_answer: String,
    is_correct: bool,
    reference: String,
    answered_at: DateTime<Utc>,
}

impl From<UserAnswerRow> for UserAnswer {
    fn from(row: UserAnswerRow) -> Self {
        UserAnswer {
            id: row.id,
            quiz_session_id: row.quiz_session_id,
            question_id: row.question_id,
            question_text: row.question_text,
            user_answer: row.user_answer,
            correct_answer: row.correct_answer,
            is_correct: row.is_correct,
            reference: row.reference,
            answered_at: row.answered_at,
        }
    }
}

fn session_gone(session_id: i64) -> AppError {
    AppError::NotFound(format!("Quiz session {} is no longer active", session_id))
}

#[async_trait]
impl QuizSessionRepository for PgQuizSessionRepository {
    async fn create(&self, user_id: i64, difficulty: Difficulty) -> AppResult<QuizSession> {
        let row = sqlx::query_as::<_, QuizSessionRow>(
            r#"
            INSERT INTO quiz_sessions (
                user_id, difficulty, current_question_index, score, status, started_at
            )
            VALUES ($1, $2, 0, 0, 'playing', now())
            RETURNING id, user_id, difficulty, current_question_index, score, status,
                      started_at, finished_at
            "#,
        )
        .bind(user_id)
        .bind(difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.into_session()
    }

    async fn find_active_by_user(&self, user_id: i64) -> AppResult<Option<QuizSession>> {
        let row = sqlx::query_as::<_, QuizSessionRow>(
            r#"
            SELECT id, user_id, difficulty, current_question_index, score, status,
                   started_at, finished_at
            FROM quiz_sessions
            WHERE user_id = $1 AND status = 'playing'
            ORDER BY started_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuizSessionRow::into_session).transpose()
    }

    async fn find_answers(&self, session_id: i64) -> AppResult<Vec<UserAnswer>> {
        let rows = sqlx::query_as::<_, UserAnswerRow>(
            r#"
            SELECT id, quiz_session_id, question_id, question_text, user_answer,
                   correct_answer, is_correct, reference, answered_at
            FROM user_answers
            WHERE quiz_session_id = $1
            ORDER BY answered_at, id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserAnswer::from).collect())
    }

    async fn record_answer(
        &self,
        session: QuizSession,
        answer: NewUserAnswer,
    ) -> AppResult<UserAnswer> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserAnswerRow>(
            r#"
            INSERT INTO user_answers (
                quiz_session_id, question_id, question_text, user_answer,
                correct_answer, is_correct, reference, answered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            RETURNING id, quiz_session_id, question_id, question_text, user_answer,
                      correct_answer, is_correct, reference, answered_at
            "#,
        )
        .bind(answer.quiz_session_id)
        .bind(answer.question_id)
        .bind(&answer.question_text)
        .bind(&answer.user_answer)
        .bind(&answer.correct_answer)
        .bind(answer.is_correct)
        .bind(&answer.reference)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET current_question_index = current_question_index + 1,
                score = score + $1
            WHERE id = $2 AND status = 'playing'
            "#,
        )
        .bind(i32::from(answer.is_correct))
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(session_gone(session.id));
        }

        tx.commit().await?;

        Ok(row.into())
    }

    async fn finish(&self, session: QuizSession) -> AppResult<HighScore> {
        let finished_at = session.finished_at.unwrap_or_else(Utc::now);
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET status = 'finished', finished_at = $1
            WHERE id = $2 AND status = 'playing'
            "#,
        )
        .bind(finished_at)
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(session_gone(session.id));
        }

        let row = sqlx::query_as::<_, HighScoreRow>(
            r#"
            INSERT INTO high_scores (user_id, difficulty, score, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, difficulty) DO UPDATE
            SET score = GREATEST(high_scores.score, EXCLUDED.score),
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, difficulty, score, updated_at
            "#,
        )
        .bind(session.user_id)
        .bind(session.difficulty.as_str())
        .bind(session.score)
        .bind(finished_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_high_score()
    }
}
