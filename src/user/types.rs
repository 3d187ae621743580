use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::models::UserModel;

/// Request payload for signing up
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub name: Option<String>,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    pub user_type: Option<String>,
}

/// Request payload for logging in
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Request payload for exchanging a refresh token
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token must not be empty"))]
    pub refresh_token: String,
}

/// Response for a successful signup
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SignupResponse {
    pub inserted_id: String,
}

/// User record as returned to clients, never carries the password hash
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub user_id: String,
    pub name: Option<String>,
    pub email: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            token: user.token,
            refresh_token: user.refresh_token,
            user_type: user.user_type,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
