use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use crate::house::repository::HouseRepository;
use crate::session::{service::SessionService, token::TokenConfig, TokenError};
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub house_repository: Arc<dyn HouseRepository + Send + Sync>,
    pub session_service: Arc<SessionService>,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        house_repository: Arc<dyn HouseRepository + Send + Sync>,
        token_config: TokenConfig,
        store_timeout: Duration,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(
            token_config,
            Arc::clone(&user_repository),
            store_timeout,
        ));

        Self {
            user_repository,
            house_repository,
            session_service,
            store_timeout,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("login or password is incorrect")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(&'static str),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal server error")]
    Internal,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("invalid data: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("invalid query: {}", rejection.body_text()))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Token(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                AppError::InvalidCredentials.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", msg),
                )
            }
            AppError::Timeout(operation) => {
                error!(operation, "Store deadline exceeded");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Store operation timed out".to_string(),
                )
            }
            AppError::JwtError(msg) => {
                error!(error = %msg, "Token signing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to issue session token".to_string(),
                )
            }
            AppError::PasswordHash(msg) => {
                error!(error = %msg, "Password hashing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Runs a store operation under the request-scoped deadline
pub async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = deadline.as_millis() as u64,
                "Store operation exceeded deadline"
            );
            Err(AppError::Timeout(operation))
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::house::models::HouseModel;
    use crate::user::models::UserModel;
    use async_trait::async_trait;

    pub const TEST_SECRET: &str = "test-signing-secret";

    pub fn test_token_config() -> TokenConfig {
        TokenConfig::with_secret(TEST_SECRET)
    }

    /// Dummy user repository that does nothing - for tests that don't care about users
    pub struct DummyUserRepository;

    #[async_trait]
    impl UserRepository for DummyUserRepository {
        async fn create_user(&self, _user: &UserModel) -> Result<(), AppError> {
            Ok(())
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn get_user(&self, _user_id: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn upsert_tokens(
            &self,
            _user_id: &str,
            _token: &str,
            _refresh_token: &str,
        ) -> Result<(), AppError> {
            Ok(())
        }
    }

    /// Dummy house repository that does nothing - for tests that don't care about houses
    pub struct DummyHouseRepository;

    #[async_trait]
    impl HouseRepository for DummyHouseRepository {
        async fn create_house(&self, _house: &HouseModel) -> Result<(), AppError> {
            Ok(())
        }
        async fn get_house(&self, _house_id: &str) -> Result<Option<HouseModel>, AppError> {
            Ok(None)
        }
        async fn search_houses(&self, _pattern: &str) -> Result<Vec<HouseModel>, AppError> {
            Ok(Vec::new())
        }
        async fn update_house(&self, _house: &HouseModel) -> Result<(), AppError> {
            Err(AppError::NotFound("house not found".to_string()))
        }
        async fn delete_house(&self, _house_id: &str) -> Result<(), AppError> {
            Err(AppError::NotFound("House not found".to_string()))
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        house_repository: Option<Arc<dyn HouseRepository + Send + Sync>>,
        token_config: TokenConfig,
        store_timeout: Duration,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                house_repository: None,
                token_config: test_token_config(),
                store_timeout: Duration::from_secs(5),
            }
        }

        pub fn with_user_repository(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_house_repository(
            mut self,
            repo: Arc<dyn HouseRepository + Send + Sync>,
        ) -> Self {
            self.house_repository = Some(repo);
            self
        }

        pub fn with_token_config(mut self, token_config: TokenConfig) -> Self {
            self.token_config = token_config;
            self
        }

        pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
            self.store_timeout = store_timeout;
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.user_repository
                    .unwrap_or_else(|| Arc::new(DummyUserRepository)),
                self.house_repository
                    .unwrap_or_else(|| Arc::new(DummyHouseRepository)),
                self.token_config,
                self.store_timeout,
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_and_message(error: AppError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, value["error"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let cases = vec![
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (AppError::Token(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                AppError::DatabaseError("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Timeout("search_houses"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let (status, _) = status_and_message(error).await;
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn test_token_error_message_is_passed_through() {
        let (_, message) = status_and_message(AppError::Token(TokenError::InvalidSignature)).await;
        assert_eq!(message, TokenError::InvalidSignature.to_string());
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: Result<(), AppError> = with_deadline(
            Duration::from_millis(10),
            "slow_op",
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Timeout("slow_op"))));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), "fast_op", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
