use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Difficulty,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
    pub reference: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Text of the option at the correct index, if the index is in range.
    pub fn correct_answer(&self) -> Option<&str> {
        usize::try_from(self.correct_answer_index)
            .ok()
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    /// Exact comparison: no trimming, no case folding.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer() == Some(answer)
    }

    /// Applies a patch in memory, used to validate the merged result before
    /// anything is written.
    pub fn merged_with(&self, patch: &QuestionPatch) -> Question {
        let mut merged = self.clone();
        if let Some(text) = &patch.question_text {
            merged.question_text = text.clone();
        }
        if let Some(options) = &patch.options {
            merged.options = options.clone();
        }
        if let Some(index) = patch.correct_answer_index {
            merged.correct_answer_index = index;
        }
        if let Some(reference) = &patch.reference {
            merged.reference = reference.clone();
        }
        if let Some(difficulty) = patch.difficulty {
            merged.difficulty = difficulty;
        }
        merged
    }
}

/// Checks that the options are non-empty and the index points into them.
pub fn check_answer_key(options: &[String], correct_answer_index: i32) -> AppResult<()> {
    if options.is_empty() {
        return Err(AppError::ValidationError(
            "Options cannot be empty".to_string(),
        ));
    }

    let in_range = usize::try_from(correct_answer_index)
        .map(|index| index < options.len())
        .unwrap_or(false);
    if !in_range {
        return Err(AppError::ValidationError(format!(
            "Invalid correct answer index {} for {} options",
            correct_answer_index,
            options.len()
        )));
    }

    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,

    #[validate(length(min = 1, message = "Options cannot be empty"))]
    pub options: Vec<String>,

    pub correct_answer_index: i32,

    #[serde(default)]
    pub reference: String,

    pub difficulty: Difficulty,
}

impl NewQuestion {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        check_answer_key(&self.options, self.correct_answer_index)
    }
}

/// Partial update: `None` means "leave unchanged".
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct QuestionPatch {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Options cannot be empty"))]
    pub options: Option<Vec<String>>,

    #[serde(default)]
    pub correct_answer_index: Option<i32>,

    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
            && self.options.is_none()
            && self.correct_answer_index.is_none()
            && self.reference.is_none()
            && self.difficulty.is_none()
    }
}

#[cfg(test)]
impl Question {
    pub fn test_question(id: i64, difficulty: Difficulty, options: &[&str], correct: i32) -> Self {
        Question {
            id,
            question_text: format!("Question {}", id),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer_index: correct,
            reference: format!("Reference {}", id),
            difficulty,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
