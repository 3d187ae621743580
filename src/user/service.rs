use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::{
    models::UserModel,
    password::{hash_password, verify_password, verify_unknown_account},
    repository::UserRepository,
    types::{LoginRequest, RefreshRequest, SignupRequest, SignupResponse, UserResponse},
};
use crate::session::service::SessionService;
use crate::shared::{with_deadline, AppError};

/// Service for signup, login and token refresh
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    session_service: Arc<SessionService>,
    store_timeout: Duration,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        session_service: Arc<SessionService>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            session_service,
            store_timeout,
        }
    }

    /// Registers a new user and returns its id
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse, AppError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        // Fast path; the store re-checks atomically on insert
        let existing = with_deadline(
            self.store_timeout,
            "find_by_email",
            self.repository.find_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            warn!("Signup rejected, email already registered");
            return Err(AppError::Conflict("this email already exists".to_string()));
        }

        let password_hash = hash_blocking(request.password).await?;

        let mut user = UserModel::new(email, request.name, password_hash, request.user_type);
        let tokens = self
            .session_service
            .issue(&user.email, user.name.as_deref(), &user.user_id)?;
        user.set_tokens(&tokens);
        debug!(user_id = %user.user_id, "Assigned id and token pair");

        with_deadline(
            self.store_timeout,
            "create_user",
            self.repository.create_user(&user),
        )
        .await?;

        info!(user_id = %user.user_id, "User signed up");
        Ok(SignupResponse {
            inserted_id: user.user_id,
        })
    }

    /// Verifies credentials and returns the user with a fresh token pair
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<UserResponse, AppError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let found = with_deadline(
            self.store_timeout,
            "find_by_email",
            self.repository.find_by_email(&email),
        )
        .await?;

        // Unknown email and wrong password produce the same error
        let mut user = match found {
            Some(user) => user,
            None => {
                warn!("Login failed, unknown email");
                verify_unknown_blocking(request.password).await?;
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_blocking(request.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.user_id, "Login failed, password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self
            .session_service
            .issue(&user.email, user.name.as_deref(), &user.user_id)?;
        self.session_service
            .persist_tokens(&user.user_id, &tokens)
            .await;
        user.set_tokens(&tokens);

        info!(user_id = %user.user_id, "User logged in");
        Ok(UserResponse::from(user))
    }

    /// Exchanges a refresh token for a new pair
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        let user = self
            .session_service
            .refresh_session(request.refresh_token.trim())
            .await?;
        Ok(UserResponse::from(user))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// argon2 is CPU-bound, keep it off the async workers
async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::PasswordHash(e.to_string()))?
}

async fn verify_blocking(candidate: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })
}

/// Same argon2 cost as a real verification
async fn verify_unknown_blocking(candidate: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_unknown_account(&candidate))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })
}
