use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, instrument, warn};

use super::types::{LoginRequest, LoginResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for issuing a bearer token
///
/// POST /api/auth/login?username=alice (or JSON body `{"username": "alice"}`)
/// Returns `{ "Token": "<jwt>" }`
#[instrument(name = "login", skip(state, query, body))]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginRequest>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = query
        .username
        .or_else(|| body.and_then(|Json(request)| request.username))
        .map(|username| username.trim().to_string())
        .filter(|username| !username.is_empty())
        .ok_or_else(|| {
            warn!("Login attempted without a username");
            AppError::Validation("username is required".to_string())
        })?;

    info!(username = %username, "Issuing token");

    let token = state.token_issuer.generate_token(&username)?;

    Ok(Json(LoginResponse { token }))
}
