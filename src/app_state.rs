use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::{Database, HealthCheck},
    repositories::{
        PgQuestionRepository, PgQuizSessionRepository, PgUserRepository, QuestionRepository,
        QuizSessionRepository, UserRepository,
    },
    services::{QuestionService, QuizSessionService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub question_service: Arc<QuestionService>,
    pub quiz_session_service: Arc<QuizSessionService>,
    pub jwt_service: Arc<JwtService>,
    pub health: Arc<dyn HealthCheck>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, db: &Database) -> Self {
        Self::from_repositories(
            config,
            Arc::new(PgUserRepository::new(db)),
            Arc::new(PgQuestionRepository::new(db)),
            Arc::new(PgQuizSessionRepository::new(db)),
            Arc::new(db.clone()),
        )
    }

    /// Wires the services over any repository implementation.
    pub fn from_repositories(
        config: Config,
        users: Arc<dyn UserRepository>,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let user_service = Arc::new(UserService::new(
            users,
            Arc::clone(&jwt_service),
            &config.admin_username,
            config.leaderboard_limit,
        ));
        let question_service = Arc::new(QuestionService::new(Arc::clone(&questions)));
        let quiz_session_service = Arc::new(QuizSessionService::new(
            sessions,
            questions,
            config.reveal_answers,
        ));

        Self {
            user_service,
            question_service,
            quiz_session_service,
            jwt_service,
            health,
            config: Arc::new(config),
        }
    }
}
