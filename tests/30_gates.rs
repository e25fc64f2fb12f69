mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use franchise_api::abilities::Role;
use franchise_api::database::UserStore;
use serde_json::json;

use common::{bare_request, TestApp};

#[tokio::test]
async fn franchisee_without_profile_is_sent_to_onboarding() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisee).await?;
    let token = app.token_for(&user).await?;

    let (status, body) = app.get("/api/franchisee/my-tasks", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["requires_onboarding"], true);
    assert_eq!(body["redirect_to"], "/onboarding");
    assert_eq!(body["code"], "ONBOARDING_REQUIRED");

    Ok(())
}

#[tokio::test]
async fn onboarding_endpoints_bypass_the_gate() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisee).await?;
    let token = app.token_for(&user).await?;

    let (status, body) = app.get("/api/onboarding/status", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["profile_completed"], false);
    assert_eq!(body["data"]["redirect_to"], "/onboarding");

    let (status, _) = app.get("/api/auth/user", &token).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn browser_requests_get_a_redirect() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisee).await?;
    let token = app.token_for(&user).await?;

    let response = app
        .send(bare_request(Method::GET, "/franchisee/my-tasks", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/onboarding")
    );

    Ok(())
}

#[tokio::test]
async fn completing_onboarding_opens_the_gate() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisee).await?;
    let token = app.token_for(&user).await?;

    let (status, body) = app
        .post("/api/onboarding/complete", &token, json!({ "phone": "555-0100" }))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["address"].is_string());
    assert!(body["field_errors"].get("phone").is_none());

    let (status, body) = app
        .post(
            "/api/onboarding/complete",
            &token,
            json!({
                "phone": "555-0100",
                "address": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "zip": "62701"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["profile_completed"], true);

    // Evaluated fresh on the next request with the same token
    let (status, body) = app.get("/api/franchisee/my-tasks", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = app.get("/api/onboarding/status", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["profile"]["city"], "Springfield");
    assert_eq!(body["data"]["profile"]["zip"], "62701");
    assert!(body["data"].get("redirect_to").is_none());

    Ok(())
}

#[tokio::test]
async fn franchisor_without_franchise_is_sent_to_registration() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisor).await?;
    let token = app.token_for(&user).await?;

    let (status, body) = app.get("/api/franchisor/royalty-management", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["requires_franchise_registration"], true);
    assert_eq!(body["redirect_to"], "/franchisor/franchise-registration");

    let (status, body) = app.get("/api/franchisor/franchise-registration", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["registered"], false);

    Ok(())
}

#[tokio::test]
async fn franchisor_can_create_a_franchise_through_the_gate() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Franchisor).await?;
    let token = app.token_for(&user).await?;

    let (status, body) = app.post("/api/franchisor/franchises", &token, json!({})).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let (status, body) = app
        .post("/api/franchisor/franchises", &token, json!({ "name": "Acme Burgers" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["name"], "Acme Burgers");

    let (status, _) = app
        .post("/api/franchises", &token, json!({ "name": "Second" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.get("/api/franchisor/royalty-management", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    Ok(())
}

#[tokio::test]
async fn ungated_roles_pass_straight_through() -> Result<()> {
    let app = TestApp::new();
    let sales = app.user(Role::Sales).await?;
    let token = app.token_for(&sales).await?;

    let (status, body) = app.get("/api/sales/leads", &token).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    Ok(())
}

#[tokio::test]
async fn franchise_creation_checks_the_stored_role() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Role::Sales).await?;
    let token = app.token_claiming(&user, Role::Franchisor).await?;

    let (status, body) = app
        .post("/api/franchisor/franchises", &token, json!({ "name": "Not Mine" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.get("/api/franchisor/franchise-registration", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.store.franchise_for_owner(user.id).await?.is_none());

    Ok(())
}
