use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Difficulty, HighScore, LeaderboardEntry, NewUser, User},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user and its three zeroed high scores atomically.
    async fn create_with_high_scores(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    /// Case-insensitive lookup.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_high_scores(&self, user_id: i64) -> AppResult<Vec<HighScore>>;
    async fn leaderboard(&self, difficulty: Difficulty, limit: i64)
        -> AppResult<Vec<LeaderboardEntry>>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        Ok(User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            role: self.role.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct HighScoreRow {
    id: i64,
    user_id: i64,
    difficulty: String,
    score: i32,
    updated_at: DateTime<Utc>,
}

impl HighScoreRow {
    pub(crate) fn into_high_score(self) -> AppResult<HighScore> {
        Ok(HighScore {
            id: self.id,
            user_id: self.user_id,
            difficulty: self.difficulty.parse()?,
            score: self.score,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LeaderboardRow {
    username: String,
    difficulty: String,
    score: i32,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_with_high_scores(&self, user: NewUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            RETURNING id, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists(format!("Username '{}' already exists", user.username))
            }
            other => other,
        })?;

        for difficulty in Difficulty::ALL {
            sqlx::query(
                "INSERT INTO high_scores (user_id, difficulty, score, updated_at) \
                 VALUES ($1, $2, 0, now())",
            )
            .bind(row.id)
            .bind(difficulty.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_user()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE lower(username) = lower($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_high_scores(&self, user_id: i64) -> AppResult<Vec<HighScore>> {
        let rows = sqlx::query_as::<_, HighScoreRow>(
            r#"
            SELECT id, user_id, difficulty, score, updated_at
            FROM high_scores
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut scores = rows
            .into_iter()
            .map(HighScoreRow::into_high_score)
            .collect::<AppResult<Vec<_>>>()?;
        scores.sort_by_key(|hs| hs.difficulty.rank());

        Ok(scores)
    }

    async fn leaderboard(
        &self,
        difficulty: Difficulty,
        limit: i64,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT u.username, hs.difficulty, hs.score, hs.updated_at
            FROM high_scores hs
            JOIN users u ON u.id = hs.user_id
            WHERE hs.difficulty = $1 AND hs.score > 0
            ORDER BY hs.score DESC, hs.updated_at ASC, u.username ASC
            LIMIT $2
            "#,
        )
        .bind(difficulty.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(LeaderboardEntry {
                    username: row.username,
                    difficulty: row.difficulty.parse()?,
                    score: row.score,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }
}
