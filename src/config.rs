use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub admin_username: String,
    pub reveal_answers: bool,
    pub leaderboard_limit: i64,
    pub app_env: String,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// `DATABASE_URL` is the only required variable.
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            AppError::InternalError("DATABASE_URL is not set".to_string())
        })?;
        let leaderboard_limit =
            at_least_one("LEADERBOARD_LIMIT", parse_or("LEADERBOARD_LIMIT", 10))?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_server_port: parse_or("PORT", 8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24),
            admin_username: env::var("ADMIN_USERNAME")
                .map(|name| name.to_lowercase())
                .unwrap_or_else(|_| "admin".to_string()),
            reveal_answers: parse_or("QUIZ_REVEAL_ANSWERS", false),
            leaderboard_limit,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Rejects secrets that are unsafe outside local development.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the default value; set it to a secure random string"
                    .to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}); it must be at least 32 characters",
                jwt_secret.len()
            )));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/quiz_test".to_string()),
            database_max_connections: 2,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            admin_username: "admin".to_string(),
            reveal_answers: false,
            leaderboard_limit: 10,
            app_env: "test".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_value(env::var(key).ok(), default)
}

fn parse_value<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn at_least_one(key: &str, value: i64) -> AppResult<i64> {
    if value < 1 {
        return Err(AppError::InternalError(format!(
            "{} must be at least 1, got {}",
            key, value
        )));
    }
    Ok(value)
}
