use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::{service::StateService, types::StateDto};
use crate::auth::TokenClaims;
use crate::shared::{AppError, AppState};

/// GET /api/state
#[instrument(name = "list_states", skip(state))]
pub async fn list_states(State(state): State<AppState>) -> Result<Json<Vec<StateDto>>, AppError> {
    let service = StateService::new(state.database.begin());
    let states = service.get_states().await?;

    info!(state_count = states.len(), "States listed successfully");

    Ok(Json(states))
}

/// GET /api/state/{id}
#[instrument(name = "get_state", skip(state))]
pub async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StateDto>, AppError> {
    let service = StateService::new(state.database.begin());
    Ok(Json(service.get_state_by_id(id).await?))
}

/// GET /api/country/{id}/states
#[instrument(name = "list_states_for_country", skip(state))]
pub async fn list_states_for_country(
    State(state): State<AppState>,
    Path(country_id): Path<i32>,
) -> Result<Json<Vec<StateDto>>, AppError> {
    let service = StateService::new(state.database.begin());
    Ok(Json(service.get_states_by_country(country_id).await?))
}

/// POST /api/state
#[instrument(name = "add_state", skip(state, claims))]
pub async fn add_state(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(dto): Json<StateDto>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, country_id = dto.country_id, "Adding state");

    let service = StateService::new(state.database.begin());
    service.add_state(dto).await
}

/// PUT /api/state
#[instrument(name = "update_state", skip(state, claims))]
pub async fn update_state(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(dto): Json<StateDto>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, state_id = dto.id, "Updating state");

    let service = StateService::new(state.database.begin());
    service.update_state(dto).await
}

/// DELETE /api/state/{id}
#[instrument(name = "delete_state", skip(state, claims))]
pub async fn delete_state(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<i32>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, state_id = id, "Deleting state");

    let service = StateService::new(state.database.begin());
    service.delete_state(id).await
}
