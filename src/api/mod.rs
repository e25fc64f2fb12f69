//! Request and response bodies shared by the server handlers and the CLI client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::abilities::AbilityRuleSet;
use crate::database::models::{Franchise, OnboardingProfile, UserSummary};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Field-level checks; returns trimmed email and the password on success
    pub fn validate(&self) -> Result<(String, String), HashMap<String, String>> {
        let mut field_errors = HashMap::new();

        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            field_errors.insert("email".to_string(), "This field is required".to_string());
        } else if !is_email(email) {
            field_errors.insert("email".to_string(), "Must be a valid email address".to_string());
        }

        let password = self.password.as_deref().unwrap_or_default();
        if password.is_empty() {
            field_errors.insert("password".to_string(), "This field is required".to_string());
        }

        if field_errors.is_empty() {
            Ok((email.to_string(), password.to_string()))
        } else {
            Err(field_errors)
        }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// `data` of a successful `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_data: UserSummary,
    pub user_ability_rules: AbilityRuleSet,
}

/// `data` of `GET /auth/user`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user_data: UserSummary,
    pub user_ability_rules: AbilityRuleSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStatus {
    pub profile_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<OnboardingProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FranchiseRegistrationStatus {
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub franchise: Option<Franchise>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFranchiseRequest {
    pub name: Option<String>,
}

/// Standard envelope `{ "success": bool, "data"?: ..., "error"?: ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
