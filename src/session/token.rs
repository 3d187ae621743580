use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::errors::TokenError;
use super::types::{RefreshClaims, SessionClaims, TokenPair, TokenUse};
use crate::config::Config;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// 24 hour access tokens, 7 day refresh tokens
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(secret, Duration::hours(24), Duration::days(7))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Signs a fresh access/refresh pair for the given identity
    #[instrument(skip(self, email, name))]
    pub fn issue(
        &self,
        email: &str,
        name: Option<&str>,
        user_id: &str,
    ) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let iat = now.timestamp() as usize;

        let access_claims = SessionClaims {
            email: email.to_string(),
            name: name.map(str::to_string),
            user_id: user_id.to_string(),
            exp: expires_at(now, self.access_ttl)?,
            iat,
            jti: Uuid::new_v4().to_string(),
            token_use: TokenUse::Access,
        };

        let refresh_claims = RefreshClaims {
            user_id: user_id.to_string(),
            exp: expires_at(now, self.refresh_ttl)?,
            iat,
            jti: Uuid::new_v4().to_string(),
            token_use: TokenUse::Refresh,
        };

        debug!(
            access_exp = access_claims.exp,
            refresh_exp = refresh_claims.exp,
            "Signing token pair"
        );

        Ok(TokenPair {
            access_token: self.sign(&access_claims)?,
            refresh_token: self.sign(&refresh_claims)?,
        })
    }

    /// Validates an access token and returns its claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims: SessionClaims = self.decode_claims(token)?;
        if claims.token_use != TokenUse::Access {
            debug!("Token is not an access token");
            return Err(TokenError::Malformed);
        }

        debug!(user_id = %claims.user_id, exp = claims.exp, "Access token decoded successfully");
        Ok(claims)
    }

    /// Validates a refresh token and returns its claims
    #[instrument(skip(self, token))]
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.decode_claims(token)?;
        if claims.token_use != TokenUse::Refresh {
            debug!("Token is not a refresh token");
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp must be strictly in the past to count as expired
        validation.leeway = 0;

        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            TokenError::from(e)
        })
    }
}

fn expires_at(now: DateTime<Utc>, ttl: Duration) -> Result<usize, AppError> {
    now.checked_add_signed(ttl)
        .map(|exp| exp.timestamp().max(0) as usize)
        .ok_or_else(|| AppError::JwtError("token lifetime out of range".to_string()))
}
