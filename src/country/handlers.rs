use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::{service::CountryService, types::CountryDto};
use crate::auth::TokenClaims;
use crate::shared::{AppError, AppState};

/// GET /api/country
#[instrument(name = "list_countries", skip(state))]
pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<Vec<CountryDto>>, AppError> {
    let service = CountryService::new(state.database.begin());
    let countries = service.get_countries().await?;

    info!(country_count = countries.len(), "Countries listed successfully");

    Ok(Json(countries))
}

/// GET /api/country/{id}
#[instrument(name = "get_country", skip(state))]
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CountryDto>, AppError> {
    let service = CountryService::new(state.database.begin());
    let country = service.get_country_by_id(id).await?;

    Ok(Json(country))
}

/// POST /api/country
#[instrument(name = "add_country", skip(state, claims))]
pub async fn add_country(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(country): Json<CountryDto>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, name = %country.name, "Adding country");

    let service = CountryService::new(state.database.begin());
    service.add_country(country).await
}

/// PUT /api/country
#[instrument(name = "update_country", skip(state, claims))]
pub async fn update_country(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(country): Json<CountryDto>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, country_id = country.id, "Updating country");

    let service = CountryService::new(state.database.begin());
    service.update_country(country).await
}

/// DELETE /api/country/{id}
#[instrument(name = "delete_country", skip(state, claims))]
pub async fn delete_country(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<i32>,
) -> Result<(), AppError> {
    info!(username = %claims.sub, country_id = id, "Deleting country");

    let service = CountryService::new(state.database.begin());
    service.delete_country(id).await
}
