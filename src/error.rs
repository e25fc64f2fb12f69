// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::gate::RedirectTarget;
use crate::services::{AuthError, RegistrationError};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    InvalidCredentials,
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),
    RegistrationRequired(RedirectTarget),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    ValidationFailed {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 429 Too Many Requests
    AccountLocked { remaining_secs: i64 },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::RegistrationRequired(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AccountLocked { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidCredentials => "The provided credentials are incorrect.".to_string(),
            ApiError::AccountLocked { remaining_secs } => format!(
                "Too many failed login attempts. Try again in {} seconds.",
                remaining_secs
            ),
            ApiError::RegistrationRequired(target) => target.message().to_string(),
            ApiError::ValidationFailed { message, .. } => message.clone(),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::RegistrationRequired(target) => target.error_code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::AccountLocked { .. } => "ACCOUNT_LOCKED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let message = self.message();
        let mut response = json!({
            "success": false,
            "error": message,
            "message": message,
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationFailed { field_errors, .. } => {
                response["field_errors"] = json!(field_errors);
            }
            ApiError::AccountLocked { remaining_secs } => {
                response["retry_after"] = json!(remaining_secs);
            }
            ApiError::RegistrationRequired(target) => {
                response[target.flag()] = json!(true);
                response["redirect_to"] = json!(target.path());
            }
            _ => {}
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn validation_failed(field_errors: HashMap<String, String>) -> Self {
        ApiError::ValidationFailed {
            message: "The given data was invalid.".to_string(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::database::StoreError> for ApiError {
    fn from(err: crate::database::StoreError) -> Self {
        match err {
            crate::database::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::database::StoreError::Conflict(msg) => ApiError::conflict(msg),
            crate::database::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            crate::database::StoreError::Unexpected(e) => {
                tracing::error!("Store error: {:#}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::AccountLocked { remaining_secs } => ApiError::AccountLocked { remaining_secs },
            AuthError::SessionInvalid => ApiError::unauthorized("Session has expired or was revoked"),
            AuthError::Token(crate::auth::JwtError::InvalidToken(msg)) => {
                tracing::debug!("Rejected token: {}", msg);
                ApiError::unauthorized("Invalid or expired token")
            }
            AuthError::Token(e) => {
                tracing::error!("Token error: {}", e);
                ApiError::internal_server_error("Could not issue session token")
            }
            AuthError::Store(e) => e.into(),
            AuthError::LockOverflow => {
                tracing::error!("Lockout duration is out of range");
                ApiError::internal_server_error("Could not record failed login")
            }
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(field_errors) => ApiError::validation_failed(field_errors),
            RegistrationError::UserNotFound => ApiError::unauthorized("User no longer exists"),
            RegistrationError::Conflict(msg) => ApiError::conflict(msg),
            RegistrationError::Store(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(self.to_json());

        if let ApiError::AccountLocked { remaining_secs } = self {
            let retry_after = remaining_secs.max(0).to_string();
            return (status, [(axum::http::header::RETRY_AFTER, retry_after)], body).into_response();
        }

        (status, body).into_response()
    }
}
