#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use franchise_api::abilities::Role;
use franchise_api::app::{build_router, AppState};
use franchise_api::auth::{token_digest, PasswordService, TokenIssuer};
use franchise_api::config::AppConfig;
use franchise_api::database::models::{Franchise, User};
use franchise_api::database::{MemoryStore, Session, UserStore};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery staple";

/// In-process application on a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config.clone(), store.clone());
        Self {
            router: build_router(state),
            store,
            config,
        }
    }

    /// A valid session token whose claims carry `role` regardless of the stored one,
    /// as if the role changed after login
    pub async fn token_claiming(&self, user: &User, role: Role) -> Result<String> {
        let mut claimed = user.clone();
        claimed.role = role.as_str().to_string();

        let issued = TokenIssuer::from_config(&self.config.security).issue(&claimed, chrono::Utc::now())?;
        self.store
            .create_session(Session {
                token_digest: token_digest(&issued.token),
                user_id: user.id,
                expires_at: issued.expires_at,
                revoked_at: None,
            })
            .await?;
        Ok(issued.token)
    }

    pub async fn user(&self, role: Role) -> Result<User> {
        self.user_with_email(role, &format!("{}-{}@example.com", role, uuid::Uuid::new_v4()))
            .await
    }

    pub async fn user_with_email(&self, role: Role, email: &str) -> Result<User> {
        let hash = PasswordService::new().hash_password(PASSWORD)?;
        let user = User::new(format!("Test {}", role), email, hash, role);
        Ok(self.store.create_user(user).await?)
    }

    pub async fn onboarded_franchisee(&self) -> Result<User> {
        let mut user = User::new(
            "Onboarded franchisee",
            format!("franchisee-{}@example.com", uuid::Uuid::new_v4()),
            PasswordService::new().hash_password(PASSWORD)?,
            Role::Franchisee,
        );
        user.profile_completed = true;
        Ok(self.store.create_user(user).await?)
    }

    pub async fn give_franchise(&self, franchisor: &User) -> Result<Franchise> {
        Ok(self
            .store
            .create_franchise(Franchise::new(franchisor.id, "Test Franchise"))
            .await?)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await?;
        let status = response.status();
        Ok((status, read_json(response).await?))
    }

    /// Log in with the shared test password and return the bearer token
    pub async fn token_for(&self, user: &User) -> Result<String> {
        let (status, body) = self.login(&user.email, PASSWORD).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response had no token")
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        let response = self.send(bare_request(Method::GET, path, Some(token))).await?;
        let status = response.status();
        Ok((status, read_json(response).await?))
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        let response = self
            .send(json_request(Method::POST, path, Some(token), body))
            .await?;
        let status = response.status();
        Ok((status, read_json(response).await?))
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub fn bare_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request should build")
}

pub async fn read_json(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
