use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{LoginRequest, RefreshRequest, SignupRequest, SignupResponse, UserResponse},
};
use crate::shared::{AppError, AppState};

fn user_service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.session_service),
        state.store_timeout,
    )
}

/// HTTP handler for signing up
///
/// POST /users/signup
/// Returns the id of the inserted user
#[instrument(name = "signup", skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, AppError> {
    let Json(request) = payload?;
    info!("Signing up new user");

    let response = user_service(&state).signup(request).await?;

    info!(user_id = %response.inserted_id, "Signup completed");
    Ok(Json(response))
}

/// HTTP handler for logging in
///
/// POST /users/login
/// Returns the user record with a fresh token pair
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(request) = payload?;

    let user = user_service(&state).login(request).await?;

    info!(user_id = %user.user_id, "Login completed");
    Ok(Json(user))
}

/// HTTP handler for refreshing a session
///
/// POST /users/refresh
#[instrument(name = "refresh", skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(request) = payload?;

    let user = user_service(&state).refresh(request).await?;

    info!(user_id = %user.user_id, "Session refreshed");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::user::repository::InMemoryUserRepository;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn create_app() -> Router {
        let app_state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        Router::new()
            .route("/users/signup", axum::routing::post(signup))
            .route("/users/login", axum::routing::post(login))
            .with_state(app_state)
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_signup_handler() {
        let app = create_app();

        let response = app
            .oneshot(json_request(
                "/users/signup",
                r#"{"email": "a@x.com", "name": "A", "password": "pw1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let signup: SignupResponse = serde_json::from_slice(&body).unwrap();
        assert!(!signup.inserted_id.is_empty());
    }

    #[tokio::test]
    async fn test_signup_handler_invalid_json() {
        let app = create_app();

        let response = app
            .oneshot(json_request("/users/signup", r#"{"email": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_signup_handler_is_conflict() {
        let app = create_app();
        let body = r#"{"email": "a@x.com", "name": "A", "password": "pw1"}"#;

        let first = app
            .clone()
            .oneshot(json_request("/users/signup", body))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(json_request("/users/signup", body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_handler_unknown_user() {
        let app = create_app();

        let response = app
            .oneshot(json_request(
                "/users/login",
                r#"{"email": "nobody@x.com", "password": "pw1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
