#![allow(dead_code, unused_macros)]

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use quiz_butterfly_server::{
    app_state::AppState,
    config::Config,
    db::HealthCheck,
    errors::{AppError, AppResult},
    models::domain::{
        Difficulty, HighScore, LeaderboardEntry, NewQuestion, NewUser, NewUserAnswer, Question,
        QuestionPatch, QuizSession, SessionStatus, User, UserAnswer,
    },
    repositories::{QuestionRepository, QuizSessionRepository, UserRepository},
};

pub const TEST_JWT_SECRET: &str = "integration_test_secret_0123456789abcdef";

pub fn test_config() -> Config {
    Config {
        database_url: SecretString::from("postgres://unused".to_string()),
        database_max_connections: 1,
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 0,
        jwt_secret: SecretString::from(TEST_JWT_SECRET.to_string()),
        jwt_expiration_hours: 1,
        admin_username: "admin".to_string(),
        reveal_answers: false,
        leaderboard_limit: 10,
        app_env: "test".to_string(),
    }
}

fn session_gone(session_id: i64) -> AppError {
    AppError::NotFound(format!("Quiz session {} is no longer active", session_id))
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    high_scores: Vec<HighScore>,
    questions: BTreeMap<i64, Question>,
    sessions: BTreeMap<i64, QuizSession>,
    answers: Vec<UserAnswer>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Implements every repository trait over shared in-memory tables with the
/// same ordering and conflict rules as the SQL versions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session(&self, id: i64) -> Option<QuizSession> {
        self.tables.read().await.sessions.get(&id).cloned()
    }

    pub async fn answer_count(&self, session_id: i64) -> usize {
        self.tables
            .read()
            .await
            .answers
            .iter()
            .filter(|a| a.quiz_session_id == session_id)
            .count()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn high_score(&self, user_id: i64, difficulty: Difficulty) -> Option<HighScore> {
        self.tables
            .read()
            .await
            .high_scores
            .iter()
            .find(|hs| hs.user_id == user_id && hs.difficulty == difficulty)
            .cloned()
    }

    /// Overwrites a stored high score, backdating it so timestamp moves are visible.
    pub async fn set_high_score(&self, user_id: i64, difficulty: Difficulty, score: i32) {
        let mut tables = self.tables.write().await;
        if let Some(hs) = tables
            .high_scores
            .iter_mut()
            .find(|hs| hs.user_id == user_id && hs.difficulty == difficulty)
        {
            hs.score = score;
            hs.updated_at = Utc::now() - Duration::days(1);
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_with_high_scores(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.username.to_lowercase() == user.username.to_lowercase());
        if taken {
            return Err(AppError::AlreadyExists(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let created = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, created.clone());

        for difficulty in Difficulty::ALL {
            let hs_id = tables.next_id();
            tables.high_scores.push(HighScore {
                id: hs_id,
                user_id: id,
                difficulty,
                score: 0,
                updated_at: now,
            });
        }

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let wanted = username.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn find_high_scores(&self, user_id: i64) -> AppResult<Vec<HighScore>> {
        let mut scores: Vec<_> = self
            .tables
            .read()
            .await
            .high_scores
            .iter()
            .filter(|hs| hs.user_id == user_id)
            .cloned()
            .collect();
        scores.sort_by_key(|hs| hs.difficulty.rank());
        Ok(scores)
    }

    async fn leaderboard(
        &self,
        difficulty: Difficulty,
        limit: i64,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<_> = tables
            .high_scores
            .iter()
            .filter(|hs| hs.difficulty == difficulty && hs.score > 0)
            .filter_map(|hs| {
                tables.users.get(&hs.user_id).map(|u| LeaderboardEntry {
                    username: u.username.clone(),
                    difficulty,
                    score: hs.score,
                    updated_at: hs.updated_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.updated_at.cmp(&b.updated_at))
                .then_with(|| a.username.cmp(&b.username))
        });
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn list_by_difficulty(&self, difficulty: Difficulty) -> AppResult<Vec<Question>> {
        Ok(self
            .tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| q.difficulty == difficulty)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn find_nth_by_difficulty(
        &self,
        difficulty: Difficulty,
        position: i64,
    ) -> AppResult<Option<Question>> {
        let Ok(position) = usize::try_from(position) else {
            return Ok(None);
        };
        Ok(self
            .tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| q.difficulty == difficulty)
            .nth(position)
            .cloned())
    }

    async fn create(&self, question: NewQuestion) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Question {
            id,
            question_text: question.question_text,
            options: question.options,
            correct_answer_index: question.correct_answer_index,
            reference: question.reference,
            difficulty: question.difficulty,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.questions.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, patch: QuestionPatch) -> AppResult<Option<Question>> {
        let mut tables = self.tables.write().await;
        Ok(tables.questions.get_mut(&id).map(|q| {
            *q = q.merged_with(&patch);
            q.updated_at = Some(Utc::now());
            q.clone()
        }))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.questions.remove(&id).is_some())
    }
}

#[async_trait]
impl QuizSessionRepository for InMemoryStore {
    async fn create(&self, user_id: i64, difficulty: Difficulty) -> AppResult<QuizSession> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let session = QuizSession {
            id,
            user_id,
            difficulty,
            current_question_index: 0,
            score: 0,
            status: SessionStatus::Playing,
            started_at: Utc::now(),
            finished_at: None,
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn find_active_by_user(&self, user_id: i64) -> AppResult<Option<QuizSession>> {
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_playing())
            .max_by_key(|s| (s.started_at, s.id))
            .cloned())
    }

    async fn find_answers(&self, session_id: i64) -> AppResult<Vec<UserAnswer>> {
        let mut answers: Vec<_> = self
            .tables
            .read()
            .await
            .answers
            .iter()
            .filter(|a| a.quiz_session_id == session_id)
            .cloned()
            .collect();
        answers.sort_by_key(|a| (a.answered_at, a.id));
        Ok(answers)
    }

    async fn record_answer(
        &self,
        session: QuizSession,
        answer: NewUserAnswer,
    ) -> AppResult<UserAnswer> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();

        let stored = tables
            .sessions
            .get_mut(&session.id)
            .filter(|s| s.is_playing())
            .ok_or_else(|| session_gone(session.id))?;
        stored.advance(answer.is_correct);

        let recorded = UserAnswer {
            id,
            quiz_session_id: answer.quiz_session_id,
            question_id: answer.question_id,
            question_text: answer.question_text,
            user_answer: answer.user_answer,
            correct_answer: answer.correct_answer,
            is_correct: answer.is_correct,
            reference: answer.reference,
            answered_at: Utc::now(),
        };
        tables.answers.push(recorded.clone());
        Ok(recorded)
    }

    async fn finish(&self, session: QuizSession) -> AppResult<HighScore> {
        let finished_at = session.finished_at.unwrap_or_else(Utc::now);
        let mut tables = self.tables.write().await;

        let stored = tables
            .sessions
            .get_mut(&session.id)
            .filter(|s| s.is_playing())
            .ok_or_else(|| session_gone(session.id))?;
        stored.finish(finished_at);

        if let Some(hs) = tables
            .high_scores
            .iter_mut()
            .find(|hs| hs.user_id == session.user_id && hs.difficulty == session.difficulty)
        {
            hs.record(session.score, finished_at);
            return Ok(hs.clone());
        }

        let id = tables.next_id();
        let created = HighScore {
            id,
            user_id: session.user_id,
            difficulty: session.difficulty,
            score: session.score,
            updated_at: finished_at,
        };
        tables.high_scores.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

pub fn app_state(store: &InMemoryStore, config: Config) -> AppState {
    let store = Arc::new(store.clone());
    AppState::from_repositories(config, store.clone(), store.clone(), store.clone(), store)
}

pub async fn seed_question(
    store: &InMemoryStore,
    difficulty: Difficulty,
    text: &str,
    options: &[&str],
    correct: i32,
) -> Question {
    QuestionRepository::create(
        store,
        NewQuestion {
            question_text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer_index: correct,
            reference: format!("About {}", text),
            difficulty,
        },
    )
    .await
    .unwrap()
}

/// Builds the full HTTP surface over the given state.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(quiz_butterfly_server::handlers::configure),
        )
        .await
    };
}

/// Registers a user through the API and evaluates to the bearer header value.
macro_rules! register {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({"username": $username, "password": $password}))
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json($app, req).await;
        format!("Bearer {}", body["token"].as_str().unwrap_or_default())
    }};
}
