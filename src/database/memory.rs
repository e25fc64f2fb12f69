//! In-memory `UserStore`.
//!
//! Used by tests and by the server when no `DATABASE_URL` is configured.
//! Nothing survives a restart.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Franchise, LoginState, OnboardingProfile, User};
use super::store::{Session, StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    franchises: HashMap<Uuid, Franchise>,
    profiles: HashMap<Uuid, OnboardingProfile>,
    sessions: HashMap<String, Session>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!("email '{}' already registered", user.email)));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save_login_state(&self, user_id: Uuid, login: &LoginState) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.apply_login_state(login);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn complete_profile(&self, user_id: Uuid, profile: &OnboardingProfile) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.profile_completed = true;
        user.updated_at = Utc::now();
        state.profiles.insert(user_id, profile.clone());
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProfile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn franchise_for_owner(&self, franchisor_id: Uuid) -> StoreResult<Option<Franchise>> {
        let state = self.state.read().await;
        Ok(state
            .franchises
            .values()
            .find(|franchise| franchise.franchisor_id == franchisor_id)
            .cloned())
    }

    async fn create_franchise(&self, franchise: Franchise) -> StoreResult<Franchise> {
        let mut state = self.state.write().await;
        if state
            .franchises
            .values()
            .any(|existing| existing.franchisor_id == franchise.franchisor_id)
        {
            return Err(StoreError::Conflict("franchisor already owns a franchise".to_string()));
        }
        state.franchises.insert(franchise.id, franchise.clone());
        Ok(franchise)
    }

    async fn create_session(&self, session: Session) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.token_digest.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> StoreResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(token_digest).cloned())
    }

    async fn revoke_session(&self, token_digest: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(session) = state.sessions.get_mut(token_digest) {
            session.revoked_at.get_or_insert(at);
        }
        Ok(())
    }

    async fn purge_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state
            .sessions
            .retain(|_, session| session.revoked_at.is_none() && session.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
