use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::abilities::rules_for_name;
use crate::api::CurrentUserResponse;
use crate::app::AppState;
use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /auth/logout - revoke the session behind the presented token
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    state.login.logout(&auth_user.token).await?;
    tracing::info!("User {} logged out", auth_user.user_id);

    Ok(ApiResponse::success(json!({ "message": "Logged out" })))
}

/// GET /auth/user - current user and ability rules derived from the stored role
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<CurrentUserResponse> {
    let user = state.registration.user(auth_user.user_id).await?;

    Ok(ApiResponse::success(CurrentUserResponse {
        user_ability_rules: rules_for_name(&user.role),
        user_data: UserSummary::from(&user),
    }))
}
