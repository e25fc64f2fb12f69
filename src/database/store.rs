use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Franchise, LoginState, OnboardingProfile, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted login session, keyed by the SHA-256 digest of its token
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token_digest: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Persistence used by the login policy and the registration gates.
///
/// Every mutation is a single-row write; concurrent writers to the same user
/// resolve as last-write-wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Overwrite the lockout columns of one user
    async fn save_login_state(&self, user_id: Uuid, state: &LoginState) -> StoreResult<()>;

    async fn complete_profile(&self, user_id: Uuid, profile: &OnboardingProfile) -> StoreResult<()>;
    /// Profile saved by `complete_profile`, `None` until onboarding is done
    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProfile>>;

    async fn franchise_for_owner(&self, franchisor_id: Uuid) -> StoreResult<Option<Franchise>>;
    async fn create_franchise(&self, franchise: Franchise) -> StoreResult<Franchise>;

    async fn create_session(&self, session: Session) -> StoreResult<()>;
    async fn find_session(&self, token_digest: &str) -> StoreResult<Option<Session>>;
    async fn revoke_session(&self, token_digest: &str, at: DateTime<Utc>) -> StoreResult<()>;
    /// Delete sessions that expired at or before `now` or were revoked; returns how many
    async fn purge_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    async fn health_check(&self) -> StoreResult<()>;
}
