//! Account endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use furnish_auth::{AuthResponse, Claims, Credentials, Registration};
use furnish_core::User;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = state.users.register(registration).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.users.login(credentials).await?))
}

/// The account behind the verified bearer token.
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    let id = claims.user_id().map_err(ApiError::from)?;
    Ok(Json(state.users.profile(id).await?))
}
