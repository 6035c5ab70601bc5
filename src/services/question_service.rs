use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{question::check_answer_key, Difficulty, NewQuestion, Question, QuestionPatch},
    repositories::QuestionRepository,
};

pub struct QuestionService {
    repository: Arc<dyn QuestionRepository>,
}

fn question_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Question {} not found", id))
}

impl QuestionService {
    pub fn new(repository: Arc<dyn QuestionRepository>) -> Self {
        Self { repository }
    }

    /// Full questions of a tier, answer key included, in id order.
    pub async fn list(&self, difficulty: &str) -> AppResult<Vec<Question>> {
        let difficulty: Difficulty = difficulty.parse()?;
        self.repository.list_by_difficulty(difficulty).await
    }

    pub async fn create(&self, question: NewQuestion) -> AppResult<Question> {
        question.check()?;

        let created = self.repository.create(question).await?;
        log::info!(
            "Created question {} in tier {}",
            created.id,
            created.difficulty
        );
        Ok(created)
    }

    /// Applies a partial update. The merged question must still have a valid
    /// answer key, so a new index is checked against the stored options and
    /// new options against the stored index.
    pub async fn update(&self, id: i64, patch: QuestionPatch) -> AppResult<Question> {
        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No fields to update".to_string(),
            ));
        }
        patch.validate()?;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| question_not_found(id))?;

        let merged = existing.merged_with(&patch);
        check_answer_key(&merged.options, merged.correct_answer_index)?;

        let updated = self
            .repository
            .update(id, patch)
            .await?
            .ok_or_else(|| question_not_found(id))?;
        log::info!("Updated question {}", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(question_not_found(id));
        }
        log::info!("Deleted question {}", id);
        Ok(())
    }
}
