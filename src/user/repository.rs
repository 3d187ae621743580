use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

const DUPLICATE_EMAIL: &str = "this email already exists";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Inserts a new user; fails with `Conflict` when the email is already taken
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;

    /// Sets the token pair on the record keyed by `user_id`, creating the record if absent
    async fn upsert_tokens(
        &self,
        user_id: &str,
        token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Email uniqueness is checked and the insert performed under the same lock,
/// so two concurrent signups for one email cannot both succeed.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserModel>>, AppError> {
        self.users.lock().map_err(|_| {
            warn!("User store lock poisoned");
            AppError::DatabaseError("user store unavailable".to_string())
        })
    }

    /// Returns the current number of user records
    pub fn user_count(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.user_id, "Creating user in memory");

        let mut users = self.lock()?;
        if users.values().any(|existing| existing.email == user.email) {
            warn!(user_id = %user.user_id, "Email already registered in memory");
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        if users.contains_key(&user.user_id) {
            warn!(user_id = %user.user_id, "User id already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.user_id.clone(), user.clone());

        debug!(user_id = %user.user_id, "User created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Looking up user by email in memory");

        let users = self.lock()?;
        Ok(users
            .values()
            .find(|user| !user.email.is_empty() && user.email == email)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from memory");

        let users = self.lock()?;
        Ok(users.get(user_id).cloned())
    }

    #[instrument(skip(self, token, refresh_token))]
    async fn upsert_tokens(
        &self,
        user_id: &str,
        token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Upserting tokens in memory");

        let mut users = self.lock()?;
        users
            .entry(user_id.to_string())
            .and_modify(|user| {
                user.token = Some(token.to_string());
                user.refresh_token = Some(refresh_token.to_string());
                user.updated_at = Utc::now();
            })
            .or_insert_with(|| UserModel::tokens_only(user_id, token, refresh_token));

        Ok(())
    }
}

/// PostgreSQL implementation of user repository
///
/// `users.email` carries a unique index; a violation on insert maps to `Conflict`.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "user_id, name, email, password_hash, token, refresh_token, user_type, created_at, updated_at";

fn user_from_row(row: &PgRow) -> Result<UserModel, sqlx::Error> {
    Ok(UserModel {
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        // Records created by a token upsert have no credentials
        email: row
            .try_get::<Option<String>, _>("email")?
            .unwrap_or_default(),
        password_hash: row
            .try_get::<Option<String>, _>("password_hash")?
            .unwrap_or_default(),
        token: row.try_get("token")?,
        refresh_token: row.try_get("refresh_token")?,
        user_type: row.try_get("user_type")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.user_id, "Creating user in database");

        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.token)
        .bind(&user.refresh_token)
        .bind(&user.user_type)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                warn!(user_id = %user.user_id, "Email already registered in database");
                AppError::Conflict(DUPLICATE_EMAIL.to_string())
            } else {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        debug!(user_id = %user.user_id, "User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Looking up user by email in database");

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to look up user by email");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from database");

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    #[instrument(skip(self, token, refresh_token))]
    async fn upsert_tokens(
        &self,
        user_id: &str,
        token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Upserting tokens in database");

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (user_id, token, refresh_token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             ON CONFLICT (user_id) DO UPDATE \
             SET token = EXCLUDED.token, refresh_token = EXCLUDED.refresh_token, updated_at = EXCLUDED.updated_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(refresh_token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to upsert tokens");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, "Tokens upserted in database");
        Ok(())
    }
}
