use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    app_state::AppState,
    auth::JwtService,
    config::Config,
    db::HealthCheck,
    errors::{AppError, AppResult},
    models::domain::User,
    repositories::{
        question_repository::MockQuestionRepository,
        quiz_session_repository::MockQuizSessionRepository,
        user_repository::MockUserRepository,
    },
};

/// Health probe with a fixed answer.
pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthCheck for StaticHealth {
    async fn health_check(&self) -> AppResult<()> {
        if self.0 {
            Ok(())
        } else {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
    }
}

pub mod fixtures {
    use super::*;

    /// State over the given mocks, using [`Config::test_config`].
    pub fn app_state(
        users: MockUserRepository,
        questions: MockQuestionRepository,
        sessions: MockQuizSessionRepository,
    ) -> AppState {
        AppState::from_repositories(
            Config::test_config(),
            Arc::new(users),
            Arc::new(questions),
            Arc::new(sessions),
            Arc::new(StaticHealth(true)),
        )
    }

    /// State whose repositories must not be touched.
    pub fn idle_app_state() -> AppState {
        app_state(
            MockUserRepository::new(),
            MockQuestionRepository::new(),
            MockQuizSessionRepository::new(),
        )
    }

    /// Bearer header value for a user signed with the test config secret.
    pub fn bearer_for(user: &User) -> String {
        let config = Config::test_config();
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let token = jwt.create_token(user).unwrap();
        format!("Bearer {}", token)
    }

    pub fn player_bearer() -> String {
        bearer_for(&User::test_user(2, "player"))
    }

    pub fn admin_bearer() -> String {
        bearer_for(&User::test_user(1, "admin"))
    }
}

pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_admin_bearer_carries_admin_role() {
        let config = Config::test_config();
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

        let token = admin_bearer();
        let claims = jwt
            .validate_token(token.strip_prefix("Bearer ").unwrap())
            .unwrap();
        assert!(claims.is_admin());

        let token = player_bearer();
        let claims = jwt
            .validate_token(token.strip_prefix("Bearer ").unwrap())
            .unwrap();
        assert!(!claims.is_admin());
        assert_eq!(claims.user_id, 2);
    }

    #[actix_web::test]
    async fn test_static_health() {
        assert!(StaticHealth(true).health_check().await.is_ok());
        assert!(StaticHealth(false).health_check().await.is_err());
    }
}
