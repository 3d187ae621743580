use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::HouseModel,
    service::HouseService,
    types::{HouseCreatedResponse, HouseRequest, HouseSearchQuery, MessageResponse},
};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

fn house_service(state: &AppState) -> HouseService {
    HouseService::new(Arc::clone(&state.house_repository), state.store_timeout)
}

/// HTTP handler for searching houses by name
///
/// GET /houses?houseName=<pattern>
/// Returns every house whose name contains the pattern, ignoring case
#[instrument(name = "search_houses", skip(state, claims, query), fields(user_id = %claims.user_id))]
pub async fn search_houses(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    query: Result<Query<HouseSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<HouseModel>>, AppError> {
    let Query(query) = query?;
    info!(pattern = ?query.house_name, "Searching houses");

    let houses = house_service(&state)
        .search_houses(query.house_name.as_deref())
        .await?;

    Ok(Json(houses))
}

/// HTTP handler for fetching one house
///
/// GET /houses/:id
#[instrument(name = "get_house", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn get_house(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(house_id): Path<String>,
) -> Result<Json<HouseModel>, AppError> {
    let house = house_service(&state).get_house(&house_id).await?;
    Ok(Json(house))
}

/// HTTP handler for creating a house
///
/// POST /houses
/// Returns 201 with the generated id
#[instrument(name = "create_house", skip(state, claims, payload), fields(user_id = %claims.user_id))]
pub async fn create_house(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<HouseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HouseCreatedResponse>), AppError> {
    let Json(request) = payload?;

    let id = house_service(&state).create_house(request).await?;

    info!(house_id = %id, "House created");
    Ok((
        StatusCode::CREATED,
        Json(HouseCreatedResponse {
            message: "House successfully created.".to_string(),
            id,
        }),
    ))
}

/// HTTP handler for replacing a house's name, access code and notes
///
/// PUT /houses/:id
#[instrument(name = "update_house", skip(state, claims, payload), fields(user_id = %claims.user_id))]
pub async fn update_house(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(house_id): Path<String>,
    payload: Result<Json<HouseRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;

    house_service(&state).update_house(&house_id, request).await?;

    Ok(Json(MessageResponse::new("House data successfully updated")))
}

/// HTTP handler for deleting a house
///
/// DELETE /houses/:id
#[instrument(name = "delete_house", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_house(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(house_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    house_service(&state).delete_house(&house_id).await?;

    Ok(Json(MessageResponse::new("House successfully deleted")))
}
