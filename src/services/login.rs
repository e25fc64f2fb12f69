//! Credential checks, account lockout and ability derivation at login.
//!
//! Lock state lives on the user row and is only evaluated when a login is
//! attempted: there is no background expiry. A lock whose `locked_until` has
//! passed is cleared, with the failure counter reset, on the next attempt.
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::abilities::{rules_for_name, AbilityRuleSet};
use crate::auth::{token_digest, Claims, JwtError, PasswordService, TokenIssuer};
use crate::config::SecurityConfig;
use crate::database::models::{LoginState, User, UserSummary};
use crate::database::{Session, StoreError, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account locked for another {remaining_secs} seconds")]
    AccountLocked { remaining_secs: i64 },

    #[error("session is not valid")]
    SessionInvalid,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("lock duration overflows the clock")]
    LockOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: i32,
    pub lock_duration: Duration,
}

impl LockoutPolicy {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            max_attempts: i32::try_from(security.max_failed_login_attempts).unwrap_or(i32::MAX),
            lock_duration: Duration::try_minutes(security.lockout_minutes).unwrap_or(Duration::MAX),
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::minutes(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
    pub ability_rules: AbilityRuleSet,
}

#[derive(Clone)]
pub struct LoginService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    passwords: PasswordService,
    lockout: LockoutPolicy,
}

impl LoginService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer, lockout: LockoutPolicy) -> Self {
        Self {
            store,
            tokens,
            passwords: PasswordService::new(),
            lockout,
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        self.login_at(email, password, Utc::now()).await
    }

    pub async fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        let Some(mut user) = self.store.find_user_by_email(email).await? else {
            warn!("Login failed: no account for the supplied email");
            return Err(AuthError::InvalidCredentials);
        };

        if user.is_locked_at(now) {
            let remaining_secs = user.lock_remaining_secs(now);
            warn!("Login refused: user {} is locked for {}s", user.id, remaining_secs);
            return Err(AuthError::AccountLocked { remaining_secs });
        }

        let mut state = user.login_state();
        if state.locked_until.take().is_some() {
            info!("Lock on user {} expired, resetting failure counter", user.id);
            state.failed_login_attempts = 0;
        }

        if !self.password_matches(&user, password) {
            self.record_failure(&user, &mut state, now).await?;
            return Err(AuthError::InvalidCredentials);
        }

        state = LoginState {
            failed_login_attempts: 0,
            last_failed_login_at: state.last_failed_login_at,
            locked_until: None,
            last_login_at: Some(now),
        };
        self.store.save_login_state(user.id, &state).await?;
        user.apply_login_state(&state);

        let issued = self.tokens.issue(&user, now)?;
        self.purge_sessions(now).await;
        self.store
            .create_session(Session {
                token_digest: token_digest(&issued.token),
                user_id: user.id,
                expires_at: issued.expires_at,
                revoked_at: None,
            })
            .await?;

        let ability_rules = rules_for_name(&user.role);
        info!(
            "User {} logged in as {} ({} ability rules)",
            user.id,
            user.role,
            ability_rules.len()
        );

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserSummary::from(&user),
            ability_rules,
        })
    }

    /// Resolve a bearer token to its claims, rejecting revoked sessions
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.tokens.verify(token)?;
        let session = self.store.find_session(&token_digest(token)).await?;

        match session {
            Some(session) if session.is_active_at(Utc::now()) => Ok(claims),
            _ => Err(AuthError::SessionInvalid),
        }
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store
            .revoke_session(&token_digest(token), Utc::now())
            .await?;
        Ok(())
    }

    /// Expired and revoked sessions are dropped on each successful login
    async fn purge_sessions(&self, now: DateTime<Utc>) {
        match self.store.purge_sessions(now).await {
            Ok(0) => {}
            Ok(purged) => debug!("Purged {} expired or revoked sessions", purged),
            Err(e) => warn!("Could not purge sessions: {}", e),
        }
    }

    fn password_matches(&self, user: &User, password: &str) -> bool {
        match self.passwords.verify_password(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Password check for user {} failed: {}", user.id, e);
                false
            }
        }
    }

    async fn record_failure(
        &self,
        user: &User,
        state: &mut LoginState,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        state.failed_login_attempts += 1;
        state.last_failed_login_at = Some(now);

        if state.failed_login_attempts >= self.lockout.max_attempts {
            let locked_until = now
                .checked_add_signed(self.lockout.lock_duration)
                .ok_or(AuthError::LockOverflow)?;
            state.locked_until = Some(locked_until);
            warn!(
                "User {} locked after {} failed login attempts",
                user.id, state.failed_login_attempts
            );
        } else {
            warn!(
                "Login failed for user {} ({} of {} attempts)",
                user.id, state.failed_login_attempts, self.lockout.max_attempts
            );
        }

        self.store.save_login_state(user.id, state).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityRule, Action, Role};
    use crate::database::MemoryStore;

    const PASSWORD: &str = "s3cret-password";

    async fn setup(role: Role) -> (LoginService, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let hash = PasswordService::new().hash_password(PASSWORD).unwrap();
        let user = store
            .create_user(User::new("Pat", "pat@example.com", hash, role))
            .await
            .unwrap();
        let service = LoginService::new(
            store.clone(),
            TokenIssuer::new("test-secret", Duration::hours(1)),
            LockoutPolicy::default(),
        );
        (service, store, user)
    }

    async fn reload(store: &MemoryStore, user: &User) -> User {
        store.find_user_by_id(user.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let (service, _, _) = setup(Role::Sales).await;
        let err = service.login("nobody@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn successful_login_returns_rules_for_role() {
        let (service, store, user) = setup(Role::Sales).await;
        let now = Utc::now();
        let outcome = service.login_at("pat@example.com", PASSWORD, now).await.unwrap();

        assert_eq!(outcome.user.id, user.id);
        assert_eq!(outcome.user.last_login_at, Some(now));
        assert_eq!(outcome.ability_rules.len(), 3);
        assert!(outcome
            .ability_rules
            .contains(&AbilityRule::new(Action::Manage, "Lead")));

        let claims = service.authenticate(&outcome.token).await.unwrap();
        assert_eq!(claims.sub, user.id);

        let stored = reload(&store, &user).await;
        assert_eq!(stored.last_login_at, Some(now));
    }

    #[tokio::test]
    async fn wrong_password_counts_failures() {
        let (service, store, user) = setup(Role::Franchisee).await;
        let now = Utc::now();
        for _ in 0..3 {
            let err = service.login_at("pat@example.com", "nope", now).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        let stored = reload(&store, &user).await;
        assert_eq!(stored.failed_login_attempts, 3);
        assert_eq!(stored.last_failed_login_at, Some(now));
        assert!(stored.locked_until.is_none());
    }

    #[tokio::test]
    async fn fifth_failure_locks_and_correct_password_is_refused() {
        let (service, store, user) = setup(Role::Franchisee).await;
        let now = Utc::now();
        for _ in 0..5 {
            let _ = service.login_at("pat@example.com", "nope", now).await;
        }

        let stored = reload(&store, &user).await;
        assert_eq!(stored.failed_login_attempts, 5);
        assert!(stored.is_locked_at(now));
        assert_eq!(stored.locked_until, Some(now + Duration::minutes(15)));

        let err = service
            .login_at("pat@example.com", PASSWORD, now + Duration::minutes(1))
            .await
            .unwrap_err();
        match err {
            AuthError::AccountLocked { remaining_secs } => assert_eq!(remaining_secs, 14 * 60),
            other => panic!("expected AccountLocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lock_expires_lazily_and_success_resets_counter() {
        let (service, store, user) = setup(Role::Franchisee).await;
        let now = Utc::now();
        for _ in 0..5 {
            let _ = service.login_at("pat@example.com", "nope", now).await;
        }

        let later = now + Duration::minutes(16);
        service
            .login_at("pat@example.com", PASSWORD, later)
            .await
            .unwrap();

        let stored = reload(&store, &user).await;
        assert_eq!(stored.failed_login_attempts, 0);
        assert!(stored.locked_until.is_none());
        assert_eq!(stored.last_login_at, Some(later));
    }

    #[tokio::test]
    async fn failure_after_expired_lock_starts_a_fresh_count() {
        let (service, store, user) = setup(Role::Franchisee).await;
        let now = Utc::now();
        for _ in 0..5 {
            let _ = service.login_at("pat@example.com", "nope", now).await;
        }

        let later = now + Duration::minutes(20);
        let err = service.login_at("pat@example.com", "nope", later).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let stored = reload(&store, &user).await;
        assert_eq!(stored.failed_login_attempts, 1);
        assert!(!stored.is_locked_at(later));
    }

    #[tokio::test]
    async fn success_clears_earlier_failures() {
        let (service, store, user) = setup(Role::Broker).await;
        let now = Utc::now();
        let _ = service.login_at("pat@example.com", "nope", now).await;
        let _ = service.login_at("pat@example.com", "nope", now).await;
        service.login_at("pat@example.com", PASSWORD, now).await.unwrap();

        assert_eq!(reload(&store, &user).await.failed_login_attempts, 0);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let (service, _, _) = setup(Role::Admin).await;
        let outcome = service.login("pat@example.com", PASSWORD).await.unwrap();
        service.logout(&outcome.token).await.unwrap();

        let err = service.authenticate(&outcome.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn lock_duration_past_the_clock_is_an_error_not_a_panic() {
        let (_, store, user) = setup(Role::Sales).await;
        let service = LoginService::new(
            store.clone(),
            TokenIssuer::new("test-secret", Duration::hours(1)),
            LockoutPolicy {
                max_attempts: 1,
                lock_duration: Duration::MAX,
            },
        );

        let err = service.login_at("pat@example.com", "nope", Utc::now()).await.unwrap_err();
        assert!(matches!(err, AuthError::LockOverflow));
        assert!(reload(&store, &user).await.locked_until.is_none());
    }

    #[tokio::test]
    async fn next_login_drops_expired_and_revoked_sessions() {
        let (service, store, _) = setup(Role::Sales).await;
        let now = Utc::now();

        let expired = service.login_at("pat@example.com", PASSWORD, now).await.unwrap();
        let revoked = service.login_at("pat@example.com", PASSWORD, now).await.unwrap();
        service.logout(&revoked.token).await.unwrap();

        let later = now + Duration::hours(2);
        let current = service.login_at("pat@example.com", PASSWORD, later).await.unwrap();

        assert!(store.find_session(&token_digest(&expired.token)).await.unwrap().is_none());
        assert!(store.find_session(&token_digest(&revoked.token)).await.unwrap().is_none());
        assert!(store.find_session(&token_digest(&current.token)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn malformed_stored_hash_counts_as_mismatch() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(User::new("Old", "old@example.com", "plaintext", Role::Sales))
            .await
            .unwrap();
        let service = LoginService::new(
            store,
            TokenIssuer::new("test-secret", Duration::hours(1)),
            LockoutPolicy::default(),
        );

        let err = service.login("old@example.com", "plaintext").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
