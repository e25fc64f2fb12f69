// Role landing pages. Each one re-checks the caller's abilities on the server;
// the rules the client holds only decide what it displays.

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::abilities::{rules_for_name, Action};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /franchisee/my-tasks
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    dashboard(&state, &auth_user, Action::Read, "Task", "my-tasks").await
}

/// GET /franchisor/royalty-management
pub async fn royalty_management(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    dashboard(&state, &auth_user, Action::Read, "Royalty", "royalty-management").await
}

/// GET /sales/leads
pub async fn sales_leads(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    dashboard(&state, &auth_user, Action::Read, "Lead", "leads").await
}

/// GET /broker/listings
pub async fn broker_listings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    dashboard(&state, &auth_user, Action::Read, "MarketplaceListing", "listings").await
}

async fn dashboard(
    state: &AppState,
    auth_user: &AuthUser,
    action: Action,
    subject: &str,
    page: &str,
) -> ApiResult<Value> {
    require_ability(state, auth_user, action, subject).await?;

    Ok(ApiResponse::success(json!({
        "page": page,
        "subject": subject,
    })))
}

/// Server-side ability check against the role currently stored for the user
pub async fn require_ability(
    state: &AppState,
    auth_user: &AuthUser,
    action: Action,
    subject: &str,
) -> Result<(), ApiError> {
    let user = state.registration.user(auth_user.user_id).await?;
    let rules = rules_for_name(&user.role);

    // A page is open to the requested action or `manage` on its subject.
    if rules.can(action, subject) || rules.can(Action::Manage, subject) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} ({}) denied {} {}",
            user.id,
            user.role,
            action,
            subject
        );
        Err(ApiError::forbidden("Insufficient permissions"))
    }
}
