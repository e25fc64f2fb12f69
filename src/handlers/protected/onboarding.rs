use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::abilities::Role;
use crate::api::OnboardingStatus;
use crate::app::AppState;
use crate::database::models::OnboardingProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /onboarding/status
pub async fn status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<OnboardingStatus> {
    let user = state.registration.user(auth_user.user_id).await?;
    require_franchisee(user.role())?;

    let redirect_to =
        (!user.profile_completed).then(|| state.config.gate.onboarding_path.clone());
    let profile = state.registration.profile(user.id).await?;

    Ok(ApiResponse::success(OnboardingStatus {
        profile_completed: user.profile_completed,
        redirect_to,
        profile,
    }))
}

/// POST /onboarding/complete - `{ phone, address, city, state, zip }`
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<OnboardingProfile>, JsonRejection>,
) -> ApiResult<OnboardingStatus> {
    let Json(profile) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let user = state.registration.user(auth_user.user_id).await?;
    require_franchisee(user.role())?;

    state
        .registration
        .complete_onboarding(auth_user.user_id, &profile)
        .await?;

    Ok(ApiResponse::success(OnboardingStatus {
        profile_completed: true,
        redirect_to: None,
        profile: Some(profile),
    }))
}

fn require_franchisee(role: Option<Role>) -> Result<(), ApiError> {
    match role {
        Some(Role::Franchisee) => Ok(()),
        _ => Err(ApiError::forbidden("Onboarding applies to franchisees only")),
    }
}
