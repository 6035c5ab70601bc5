pub mod question_service;
pub mod quiz_session_service;
pub mod user_service;

pub use question_service::QuestionService;
pub use quiz_session_service::QuizSessionService;
pub use user_service::UserService;
