use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::abilities::Role;
use crate::api::{CreateFranchiseRequest, FranchiseRegistrationStatus};
use crate::app::AppState;
use crate::database::models::Franchise;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /franchisor/franchise-registration
pub async fn registration_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<FranchiseRegistrationStatus> {
    require_franchisor(&state, &auth_user).await?;
    let franchise = state.registration.franchise_for(auth_user.user_id).await?;

    Ok(ApiResponse::success(FranchiseRegistrationStatus {
        registered: franchise.is_some(),
        franchise,
    }))
}

/// POST /franchisor/franchises - `{ name }`, one franchise per franchisor
pub async fn create_franchise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateFranchiseRequest>, JsonRejection>,
) -> ApiResult<Franchise> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    require_franchisor(&state, &auth_user).await?;

    let franchise = state
        .registration
        .register_franchise(auth_user.user_id, payload.name.as_deref().unwrap_or_default())
        .await?;

    Ok(ApiResponse::created(franchise))
}

/// Checks the role currently stored for the user, not the one in the token
async fn require_franchisor(state: &AppState, auth_user: &AuthUser) -> Result<(), ApiError> {
    let user = state.registration.user(auth_user.user_id).await?;
    match user.role() {
        Some(Role::Franchisor) => Ok(()),
        _ => Err(ApiError::forbidden("Franchise registration applies to franchisors only")),
    }
}
