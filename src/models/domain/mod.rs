pub mod difficulty;
pub mod high_score;
pub mod question;
pub mod quiz_session;
pub mod user;
pub mod user_answer;

pub use difficulty::Difficulty;
pub use high_score::{HighScore, LeaderboardEntry};
pub use question::{NewQuestion, Question, QuestionPatch};
pub use quiz_session::{QuizSession, SessionStatus};
pub use user::{NewUser, User, UserRole};
pub use user_answer::{NewUserAnswer, UserAnswer};
