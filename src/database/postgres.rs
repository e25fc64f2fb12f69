use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::models::{Franchise, LoginState, OnboardingProfile, User};
use super::store::{Session, StoreError, StoreResult, UserStore};

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role, profile_completed,
    failed_login_attempts, last_failed_login_at, locked_until, last_login_at,
    created_at, updated_at
"#;

/// Postgres-backed store; schema in `sql/schema.sql`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, profile_completed,
                failed_login_attempts, last_failed_login_at, locked_until, last_login_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.profile_completed)
            .bind(user.failed_login_attempts)
            .bind(user.last_failed_login_at)
            .bind(user.locked_until)
            .bind(user.last_login_at)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, format!("email '{}' already registered", user.email)))
    }

    async fn save_login_state(&self, user_id: Uuid, state: &LoginState) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = $2,
                last_failed_login_at = $3,
                locked_until = $4,
                last_login_at = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(state.failed_login_attempts)
        .bind(state.last_failed_login_at)
        .bind(state.locked_until)
        .bind(state.last_login_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn complete_profile(&self, user_id: Uuid, profile: &OnboardingProfile) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET profile_completed = true,
                phone = $2, address = $3, city = $4, state = $5, zip = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.zip)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProfile>> {
        let row = sqlx::query(
            r#"
            SELECT phone, address, city, state, zip
            FROM users
            WHERE id = $1 AND profile_completed
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| OnboardingProfile {
            phone: row.get::<Option<String>, _>("phone").unwrap_or_default(),
            address: row.get::<Option<String>, _>("address").unwrap_or_default(),
            city: row.get::<Option<String>, _>("city").unwrap_or_default(),
            state: row.get::<Option<String>, _>("state").unwrap_or_default(),
            zip: row.get::<Option<String>, _>("zip").unwrap_or_default(),
        }))
    }

    async fn franchise_for_owner(&self, franchisor_id: Uuid) -> StoreResult<Option<Franchise>> {
        let franchise = sqlx::query_as::<_, Franchise>(
            "SELECT id, franchisor_id, name, created_at FROM franchises WHERE franchisor_id = $1",
        )
        .bind(franchisor_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(franchise)
    }

    async fn create_franchise(&self, franchise: Franchise) -> StoreResult<Franchise> {
        sqlx::query_as::<_, Franchise>(
            r#"
            INSERT INTO franchises (id, franchisor_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, franchisor_id, name, created_at
            "#,
        )
        .bind(franchise.id)
        .bind(franchise.franchisor_id)
        .bind(&franchise.name)
        .bind(franchise.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "franchisor already owns a franchise".to_string()))
    }

    async fn create_session(&self, session: Session) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_digest, user_id, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token_digest)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.revoked_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> StoreResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token_digest, user_id, expires_at, revoked_at FROM sessions WHERE token_digest = $1",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Session {
            token_digest: row.get("token_digest"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
            revoked_at: row.get("revoked_at"),
        }))
    }

    async fn revoke_session(&self, token_digest: &str, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(
            "UPDATE sessions SET revoked_at = $2 WHERE token_digest = $1 AND revoked_at IS NULL",
        )
        .bind(token_digest)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at <= $1 OR revoked_at IS NOT NULL",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn unique_violation(err: sqlx::Error, message: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(message)
        }
        _ => StoreError::Sqlx(err),
    }
}
