use serde::{Deserialize, Serialize};

/// Which half of a token pair a token was issued as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub user_id: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
    pub jti: String, // Unique per issued token
    pub token_use: TokenUse,
}

/// JWT claims carried by a refresh token, identity is limited to the user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    pub user_id: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub token_use: TokenUse,
}

/// Access and refresh token issued together
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
