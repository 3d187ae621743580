// Public API - what other modules can use
pub use errors::TokenError;
pub use middleware::{require_token, TOKEN_HEADER};
pub use types::{RefreshClaims, SessionClaims, TokenPair, TokenUse};

// Internal modules
mod errors;
mod middleware;
pub mod service;
pub mod token;
mod types;
