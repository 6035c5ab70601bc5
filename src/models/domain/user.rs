use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Role granted at registration: the configured admin name gets `Admin`.
    pub fn for_username(username: &str, admin_username: &str) -> Self {
        if username == admin_username {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(AppError::InternalError(format!("Unknown user role '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted; the username is already canonical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn new(username: &str, password_hash: String, admin_username: &str) -> Self {
        let username = canonical_username(username);
        let role = UserRole::for_username(&username, admin_username);

        Self {
            username,
            password_hash,
            role,
        }
    }
}

/// Usernames are unique without regard to case, so they are stored lowercased.
pub fn canonical_username(username: &str) -> String {
    username.to_lowercase()
}

#[cfg(test)]
impl User {
    pub fn test_user(id: i64, username: &str) -> Self {
        let now = Utc::now();
        User {
            id,
            username: username.to_string(),
            password_hash: "$argon2id$test".to_string(),
            role: UserRole::for_username(username, "admin"),
            created_at: now,
            updated_at: now,
        }
    }
}
