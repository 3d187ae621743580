// Library crate for the house access server
// This file exposes the router and public API for integration tests

pub mod config;
pub mod house;
pub mod session;
pub mod shared;
pub mod user;

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

// Re-export commonly used types for easier access in tests
pub use config::{Config, ConfigError};
pub use house::{models::HouseModel, repository::HouseRepository};
pub use session::{token::TokenConfig, SessionClaims, TokenError, TOKEN_HEADER};
pub use shared::{AppError, AppState};
pub use user::repository::UserRepository;

/// Builds the full application: public user routes plus token-guarded house routes
/// (mounted at `/houses`, `/resources` and the legacy `/api/houses`)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/users/signup", post(user::signup))
        .route("/users/login", post(user::login))
        .route("/users/refresh", post(user::refresh))
        .nest("/houses", house_routes(&state))
        .nest("/resources", house_routes(&state))
        .nest("/api/houses", house_routes(&state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn house_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(house::search_houses).post(house::create_house))
        .route(
            "/:id",
            get(house::get_house)
                .put(house::update_house)
                .delete(house::delete_house),
        )
        // route_layer so unmatched paths still 404 instead of 401
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_token,
        ))
}

/// Any origin, any header; preflight is answered here before the token guard runs
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
}
