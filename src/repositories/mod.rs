pub mod question_repository;
pub mod quiz_session_repository;
pub mod user_repository;

pub use question_repository::{PgQuestionRepository, QuestionRepository};
pub use quiz_session_repository::{PgQuizSessionRepository, QuizSessionRepository};
pub use user_repository::{PgUserRepository, UserRepository};
