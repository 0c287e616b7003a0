use std::sync::Arc;

use bcrypt::{hash, verify};
use sqlx::{SqlitePool, Transaction, sqlite::Sqlite};

use crate::models::{LoginRequest, RegisterRequest, TokenResponse, User, UserResponse};
use crate::utils::{ApiError, ApiResult, JwtUtil};

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    jwt_util: Arc<JwtUtil>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(pool: SqlitePool, jwt_util: Arc<JwtUtil>, bcrypt_cost: u32) -> Self {
        Self { pool, jwt_util, bcrypt_cost }
    }

    pub async fn register(&self, req: RegisterRequest) -> ApiResult<UserResponse> {
        let mut tx = self.pool.begin().await?;

        self.ensure_available(&mut tx, "email", &req.email, "Email already registered")
            .await?;
        self.ensure_available(&mut tx, "username", &req.username, "Username already taken")
            .await?;

        let password_hash = hash(&req.password, self.bcrypt_cost)
            .map_err(|err| ApiError::internal_error(format!("Failed to hash password: {}", err)))?;

        let result = {
            let conn = tx.as_mut();
            sqlx::query(
                "INSERT INTO users (email, username, password_hash, full_name, role) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&req.email)
            .bind(&req.username)
            .bind(&password_hash)
            .bind(&req.full_name)
            .bind(req.role)
            .execute(conn)
            .await
            .map_err(|err| map_unique_violation(err, "Email or username already registered"))?
        };

        let user_id = result.last_insert_rowid();
        tx.commit().await?;

        tracing::info!("Registered user {} (ID: {})", req.username, user_id);
        Ok(self.fetch_user(user_id).await?.into())
    }

    /// Authenticate by username or email and issue an access token
    pub async fn login(&self, req: LoginRequest) -> ApiResult<TokenResponse> {
        // An exact username match wins over another account's email
        let user: Option<User> = sqlx::query_as(
            "SELECT * FROM users WHERE username = ? OR email = ? \
             ORDER BY (username = ?) DESC, id ASC LIMIT 1",
        )
        .bind(&req.username)
        .bind(&req.username)
        .bind(&req.username)
        .fetch_optional(&self.pool)
        .await?;

        let user = user.ok_or_else(|| {
            tracing::warn!("Login failed: unknown user {}", req.username);
            ApiError::invalid_credentials()
        })?;

        let password_ok = verify(&req.password, &user.password_hash).map_err(|err| {
            tracing::error!("Stored password hash for user {} is unreadable: {}", user.id, err);
            ApiError::invalid_credentials()
        })?;
        if !password_ok {
            tracing::warn!("Login failed: wrong password for {}", user.username);
            return Err(ApiError::invalid_credentials());
        }

        if !user.is_active {
            return Err(ApiError::InactiveUser);
        }

        let access_token =
            self.jwt_util
                .generate_token(user.id, &user.username, user.role.as_str())?;

        tracing::info!("User {} logged in", user.username);
        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt_util.expires_in_secs(),
        })
    }

    /// Resolve the user behind a verified token
    pub async fn get_active_user(&self, user_id: i64) -> ApiResult<User> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let user = user.ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
        if !user.is_active {
            return Err(ApiError::InactiveUser);
        }
        Ok(user)
    }

    pub async fn set_active(&self, user_id: i64, is_active: bool) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(is_active)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("User"));
        }
        Ok(())
    }

    async fn fetch_user(&self, user_id: i64) -> ApiResult<User> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }

    async fn ensure_available(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        column: &'static str,
        value: &str,
        message: &'static str,
    ) -> ApiResult<()> {
        let sql = format!("SELECT id FROM users WHERE {} = ?", column);
        let existing: Option<(i64,)> = {
            let conn = tx.as_mut();
            sqlx::query_as(&sql)
                .bind(value)
                .fetch_optional(conn)
                .await?
        };

        if existing.is_some() {
            return Err(ApiError::already_exists(message));
        }
        Ok(())
    }
}

/// Turn a UNIQUE constraint failure into a 400, pass everything else through
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> ApiError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => ApiError::already_exists(message),
        _ => ApiError::from(err),
    }
}
