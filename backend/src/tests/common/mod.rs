// Common test utilities and helpers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::AppState;
use crate::config::Config;
use crate::models::{CreateBookRequest, RegisterRequest, UserRole};
use crate::services::llm::{LLMCompletion, LLMError, LLMPromptTrait, LLMService, TokenUsage};
use crate::services::{CacheService, MemoryCache};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Defaults with the cheapest bcrypt cost and the in-process cache
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret".to_string();
    config.auth.bcrypt_cost = 4;
    config.cache.backend = "memory".to_string();
    config
}

pub fn memory_cache() -> CacheService {
    CacheService::new(Arc::new(MemoryCache::new()), Duration::from_secs(60))
}

pub async fn create_test_state(llm: Arc<StubLLM>) -> (Arc<AppState>, SqlitePool) {
    let pool = create_test_db().await;
    let state = AppState::new(test_config(), pool.clone(), memory_cache(), llm)
        .expect("Failed to build app state");
    (Arc::new(state), pool)
}

// ============================================================================
// Stub LLM
// ============================================================================

enum StubReply {
    Text(String),
    RateLimited,
    ProviderError,
}

/// Canned LLM that records the prompts it receives
pub struct StubLLM {
    available: bool,
    reply: StubReply,
    calls: AtomicUsize,
    last_user_prompt: Mutex<Option<String>>,
}

impl StubLLM {
    fn with(available: bool, reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            available,
            reply,
            calls: AtomicUsize::new(0),
            last_user_prompt: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(true, StubReply::Text(text.to_string()))
    }

    pub fn unavailable() -> Arc<Self> {
        Self::with(false, StubReply::ProviderError)
    }

    pub fn failing() -> Arc<Self> {
        Self::with(true, StubReply::ProviderError)
    }

    pub fn rate_limited() -> Arc<Self> {
        Self::with(true, StubReply::RateLimited)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.last_user_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMService for StubLLM {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, prompt: &dyn LLMPromptTrait) -> Result<LLMCompletion, LLMError> {
        if !self.available {
            return Err(LLMError::NotConfigured);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_prompt.lock().unwrap() = Some(prompt.user_prompt());

        match &self.reply {
            StubReply::Text(text) => Ok(LLMCompletion {
                content: text.clone(),
                usage: TokenUsage::default(),
                latency_ms: 1,
            }),
            StubReply::RateLimited => Err(LLMError::RateLimited("slow down".to_string())),
            StubReply::ProviderError => Err(LLMError::ApiError("HTTP 500: boom".to_string())),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn register_request(username: &str) -> RegisterRequest {
    RegisterRequest {
        email: format!("{}@example.com", username),
        username: username.to_string(),
        full_name: Some(format!("{} Reader", username)),
        password: "password123".to_string(),
        role: UserRole::User,
    }
}

pub fn book_request(title: &str, author: &str, genre: &str) -> CreateBookRequest {
    CreateBookRequest {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        year_published: 1965,
    }
}

/// Insert a user directly; the password hash is not usable for login
pub async fn create_user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query("INSERT INTO users (email, username, password_hash) VALUES (?, ?, 'x')")
        .bind(format!("{}@example.com", username))
        .bind(username)
        .execute(pool)
        .await
        .expect("Failed to insert user")
        .last_insert_rowid()
}

pub async fn create_book(pool: &SqlitePool, title: &str, genre: &str) -> i64 {
    sqlx::query(
        "INSERT INTO books (title, author, genre, year_published) VALUES (?, 'Test Author', ?, 2000)",
    )
    .bind(title)
    .bind(genre)
    .execute(pool)
    .await
    .expect("Failed to insert book")
    .last_insert_rowid()
}

pub async fn create_review(pool: &SqlitePool, book_id: i64, user_id: i64, rating: i32) -> i64 {
    sqlx::query(
        "INSERT INTO reviews (book_id, user_id, review_text, rating) VALUES (?, ?, 'A perfectly fine read.', ?)",
    )
    .bind(book_id)
    .bind(user_id)
    .bind(rating)
    .execute(pool)
    .await
    .expect("Failed to insert review")
    .last_insert_rowid()
}
