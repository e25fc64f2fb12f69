use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::gate::{GateDecision, GateRequest};
use super::auth::AuthUser;

/// Runs the gate chain for the authenticated user.
///
/// Registration state is loaded from the store on every request. API-style
/// requests get a 403 JSON body with a redirect hint; page requests get a
/// `303 See Other`.
pub async fn registration_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = request.extensions().get::<AuthUser>().map(|u| u.user_id);
    let subject = match user_id {
        Some(user_id) => {
            let subject = state.registration.gate_subject(user_id).await?;
            if subject.is_none() {
                return Err(ApiError::unauthorized("User no longer exists"));
            }
            subject
        }
        None => None,
    };

    // Nested routers see the path without `/api`; the full URI decides the response style
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let gate_request = GateRequest::new(subject, request.method().clone(), &path);

    match state.gates.evaluate(&gate_request) {
        GateDecision::Allow => Ok(next.run(request).await),
        GateDecision::RedirectRequired(target) => {
            tracing::warn!(
                "Registration gate blocked {} {} -> {}",
                gate_request.method,
                gate_request.path,
                target.path()
            );
            if wants_json(&path, request.headers()) {
                Err(ApiError::RegistrationRequired(target))
            } else {
                Ok(Redirect::to(target.path()).into_response())
            }
        }
    }
}

/// API clients are recognised by path prefix, `Accept`, or `X-Requested-With`
pub fn wants_json(path: &str, headers: &HeaderMap) -> bool {
    if path == "/api" || path.starts_with("/api/") {
        return true;
    }

    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.contains("json"));

    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.eq_ignore_ascii_case("XMLHttpRequest"));

    accepts_json || is_xhr
}
