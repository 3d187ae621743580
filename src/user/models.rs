use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::session::TokenPair;

/// Stored user record
#[derive(Debug, Clone)]
pub struct UserModel {
    pub user_id: String, // UUID v4, assigned at signup
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String, // argon2 PHC string
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user with a generated id and no tokens
    pub fn new(
        email: String,
        name: Option<String>,
        password_hash: String,
        user_type: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            token: None,
            refresh_token: None,
            user_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record holding only token fields, produced when tokens are upserted for an unknown id
    pub fn tokens_only(user_id: &str, token: &str, refresh_token: &str) -> Self {
        let now = Utc::now();

        Self {
            user_id: user_id.to_string(),
            name: None,
            email: String::new(),
            password_hash: String::new(),
            token: Some(token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
            user_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_tokens(&mut self, tokens: &TokenPair) {
        self.token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
        self.updated_at = Utc::now();
    }
}
