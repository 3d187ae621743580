use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::{
    errors::TokenError,
    token::TokenConfig,
    types::{SessionClaims, TokenPair},
};
use crate::shared::{with_deadline, AppError};
use crate::user::{models::UserModel, repository::UserRepository};

/// Service for issuing, validating and persisting session tokens
pub struct SessionService {
    token_config: TokenConfig,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    store_timeout: Duration,
}

impl SessionService {
    pub fn new(
        token_config: TokenConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            token_config,
            user_repository,
            store_timeout,
        }
    }

    /// Signs a new token pair for the given identity
    pub fn issue(
        &self,
        email: &str,
        name: Option<&str>,
        user_id: &str,
    ) -> Result<TokenPair, AppError> {
        self.token_config.issue(email, name, user_id)
    }

    /// Validates an access token and returns the claims if valid
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.token_config.validate_token(token)
    }

    /// Writes the token pair onto the user record, inserting the token fields if the record is absent
    #[instrument(skip(self, tokens))]
    pub async fn store_tokens(&self, user_id: &str, tokens: &TokenPair) -> Result<(), AppError> {
        with_deadline(
            self.store_timeout,
            "upsert_tokens",
            self.user_repository
                .upsert_tokens(user_id, &tokens.access_token, &tokens.refresh_token),
        )
        .await
    }

    /// Best-effort variant of `store_tokens`: failures are logged and swallowed
    #[instrument(skip(self, tokens))]
    pub async fn persist_tokens(&self, user_id: &str, tokens: &TokenPair) {
        match self.store_tokens(user_id, tokens).await {
            Ok(()) => info!(user_id = %user_id, "Persisted token pair"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to persist token pair"),
        }
    }

    /// Exchanges the current refresh token for a new pair
    ///
    /// The presented token must still be the one stored on the user record, so a
    /// refresh token replaced by a later login or refresh stops working.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_refresh_token(refresh_token)?;

        let mut user = with_deadline(
            self.store_timeout,
            "get_user",
            self.user_repository.get_user(&claims.user_id),
        )
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.user_id, "Refresh token refers to unknown user");
            AppError::Unauthorized("refresh token is no longer valid".to_string())
        })?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            warn!(user_id = %claims.user_id, "Refresh token has been superseded");
            return Err(AppError::Unauthorized(
                "refresh token is no longer valid".to_string(),
            ));
        }

        let tokens = self.issue(&user.email, user.name.as_deref(), &user.user_id)?;
        self.store_tokens(&user.user_id, &tokens).await?;
        user.set_tokens(&tokens);

        info!(user_id = %user.user_id, "Session refreshed");
        Ok(user)
    }
}
