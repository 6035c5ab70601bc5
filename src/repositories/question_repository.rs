use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Difficulty, NewQuestion, Question, QuestionPatch},
};

const QUESTION_COLUMNS: &str = "id, question_text, options, correct_answer_index, reference, \
                                difficulty, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// All questions of a tier, ordered by id ascending.
    async fn list_by_difficulty(&self, difficulty: Difficulty) -> AppResult<Vec<Question>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>>;
    /// The question at `position` (0-based) in the tier's id-ascending order.
    async fn find_nth_by_difficulty(
        &self,
        difficulty: Difficulty,
        position: i64,
    ) -> AppResult<Option<Question>>;
    async fn create(&self, question: NewQuestion) -> AppResult<Question>;
    /// Returns `None` when no question has this id.
    async fn update(&self, id: i64, patch: QuestionPatch) -> AppResult<Option<Question>>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

pub struct PgQuestionRepository {
    pool: PgPool,
}

impl PgQuestionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
    options: Vec<String>,
    correct_answer_index: i32,
    reference: String,
    difficulty: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl QuestionRow {
    fn into_question(self) -> AppResult<Question> {
        Ok(Question {
            id: self.id,
            question_text: self.question_text,
            options: self.options,
            correct_answer_index: self.correct_answer_index,
            reference: self.reference,
            difficulty: self.difficulty.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl QuestionRepository for PgQuestionRepository {
    async fn list_by_difficulty(&self, difficulty: Difficulty) -> AppResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE difficulty = $1 ORDER BY id"
        ))
        .bind(difficulty.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuestionRow::into_question).transpose()
    }

    async fn find_nth_by_difficulty(
        &self,
        difficulty: Difficulty,
        position: i64,
    ) -> AppResult<Option<Question>> {
        if position < 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE difficulty = $1 ORDER BY id LIMIT 1 OFFSET $2"
        ))
        .bind(difficulty.as_str())
        .bind(position)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuestionRow::into_question).transpose()
    }

    async fn create(&self, question: NewQuestion) -> AppResult<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            INSERT INTO questions (
                question_text, options, correct_answer_index, reference, difficulty, created_at
            )
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(question.question_text)
        .bind(question.options)
        .bind(question.correct_answer_index)
        .bind(question.reference)
        .bind(question.difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.into_question()
    }

    async fn update(&self, id: i64, patch: QuestionPatch) -> AppResult<Option<Question>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE questions SET ");

        {
            let mut fields = builder.separated(", ");
            if let Some(text) = patch.question_text {
                fields.push("question_text = ").push_bind_unseparated(text);
            }
            if let Some(options) = patch.options {
                fields.push("options = ").push_bind_unseparated(options);
            }
            if let Some(index) = patch.correct_answer_index {
                fields.push("correct_answer_index = ").push_bind_unseparated(index);
            }
            if let Some(reference) = patch.reference {
                fields.push("reference = ").push_bind_unseparated(reference);
            }
            if let Some(difficulty) = patch.difficulty {
                fields.push("difficulty = ").push_bind_unseparated(difficulty.as_str());
            }
            fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(QUESTION_COLUMNS);

        let row = builder
            .build_query_as::<QuestionRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(QuestionRow::into_question).transpose()
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
