use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::shared::{AppError, AppState};

/// Request header carrying the raw access token
pub const TOKEN_HEADER: &str = "token";

/// Token guard - validates the `token` header and adds SessionClaims to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), session::require_token))
/// Handlers can then extract Extension(claims): Extension<SessionClaims>.
#[instrument(skip(state, req, next))]
pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    info!("Token guard triggered for request {}", req.uri());

    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Missing token header in request");
            AppError::Unauthorized("no authorisation header provided".to_string())
        })?;

    let claims = match state.session_service.validate_session(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Token authentication failed: {}", e);
            return Err(AppError::Token(e));
        }
    };

    info!(
        user_id = %claims.user_id,
        "Authentication successful, adding claims to request"
    );

    // Claims are scoped to this request only
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
