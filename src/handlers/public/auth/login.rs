// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::{LoginRequest, LoginResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/login - Authenticate and receive a session token with ability rules
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expiresAt": "2025-01-01T00:00:00Z",
///     "userData": { "id": "...", "name": "...", "email": "...", "role": "sales", ... },
///     "userAbilityRules": [{ "action": "manage", "subject": "Lead" }]
///   }
/// }
/// ```
///
/// Errors: 401 invalid credentials, 422 missing/invalid fields, 429 account locked.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (email, password) = payload.validate().map_err(ApiError::validation_failed)?;

    let outcome = state.login.login(&email, &password).await?;

    Ok(ApiResponse::success(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user_data: outcome.user,
        user_ability_rules: outcome.ability_rules,
    }))
}
