use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::abilities::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub profile_completed: bool,
    pub failed_login_attempts: i32,
    pub last_failed_login_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: role.as_str().to_string(),
            profile_completed: false,
            failed_login_attempts: 0,
            last_failed_login_at: None,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parsed role, `None` when the stored name is not a known role
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map_or(false, |until| now < until)
    }

    /// Whole seconds until the lock lifts, rounded up; 0 when not locked
    pub fn lock_remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.locked_until {
            Some(until) if now < until => {
                let millis = (until - now).num_milliseconds();
                (millis + 999) / 1000
            }
            _ => 0,
        }
    }

    pub fn login_state(&self) -> LoginState {
        LoginState {
            failed_login_attempts: self.failed_login_attempts,
            last_failed_login_at: self.last_failed_login_at,
            locked_until: self.locked_until,
            last_login_at: self.last_login_at,
        }
    }

    pub fn apply_login_state(&mut self, state: &LoginState) {
        self.failed_login_attempts = state.failed_login_attempts;
        self.last_failed_login_at = state.last_failed_login_at;
        self.locked_until = state.locked_until;
        self.last_login_at = state.last_login_at;
    }
}

/// The lockout columns of a user row, written back as one update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub failed_login_attempts: i32,
    pub last_failed_login_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User fields returned to clients as `userData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_completed: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            profile_completed: user.profile_completed,
            last_login_at: user.last_login_at,
        }
    }
}
