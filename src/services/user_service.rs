use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        JwtService,
    },
    errors::{AppError, AppResult},
    models::{
        domain::{user::canonical_username, Difficulty, NewUser},
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::{AuthResponse, LeaderboardResponse, UserProfile},
        },
    },
    repositories::UserRepository,
};

/// Registration, login and the per-user views built on high scores.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    admin_username: String,
    leaderboard_limit: i64,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        admin_username: &str,
        leaderboard_limit: i64,
    ) -> Self {
        Self {
            repository,
            jwt_service,
            admin_username: canonical_username(admin_username),
            leaderboard_limit,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let username = canonical_username(&request.username);
        if self.repository.find_by_username(&username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))??;

        let new_user = NewUser::new(&username, password_hash, &self.admin_username);
        let user = self.repository.create_with_high_scores(new_user).await?;
        log::info!(
            "Registered user '{}' (id {}, role {})",
            user.username,
            user.id,
            user.role.as_str()
        );

        let token = self.jwt_service.create_token(&user)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(invalid)?;

        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Password check task failed: {}", e)))?;

        if !verified {
            log::debug!("Failed login for '{}'", user.username);
            return Err(invalid());
        }

        let token = self.jwt_service.create_token(&user)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn profile(&self, user_id: i64) -> AppResult<UserProfile> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let high_scores = self.repository.find_high_scores(user_id).await?;

        Ok(UserProfile {
            user: user.into(),
            high_scores,
        })
    }

    pub async fn leaderboard(&self, difficulty: &str) -> AppResult<LeaderboardResponse> {
        let difficulty: Difficulty = difficulty.parse()?;
        let entries = self
            .repository
            .leaderboard(difficulty, self.leaderboard_limit)
            .await?;

        Ok(LeaderboardResponse {
            difficulty,
            entries,
        })
    }
}
