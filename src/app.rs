use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::UserStore;
use crate::gate::GateChain;
use crate::handlers;
use crate::middleware::{registration_gate, require_auth};
use crate::services::{LockoutPolicy, LoginService, RegistrationService};

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub login: LoginService,
    pub registration: RegistrationService,
    pub gates: GateChain,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Self {
        let login = LoginService::new(
            store.clone(),
            TokenIssuer::from_config(&config.security),
            LockoutPolicy::from_config(&config.security),
        );
        let registration = RegistrationService::new(store);
        let gates = GateChain::from_config(&config.gate);

        Self {
            config: Arc::new(config),
            login,
            registration,
            gates,
        }
    }
}

/// Full application router: routes served at `/` and again under `/api`
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(routes(state.clone()))
        .nest("/api", routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::public::auth::login_post))
        .merge(protected_routes(state))
}

/// Authenticated routes. Layers run bottom-up: `require_auth`, then the
/// registration gates, then the handler.
fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, dashboards, franchisor, onboarding};

    Router::new()
        // Session
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", get(auth::current_user))
        // Franchisee onboarding
        .route("/onboarding/status", get(onboarding::status))
        .route("/onboarding/complete", post(onboarding::complete))
        // Franchisor registration
        .route(
            "/franchisor/franchise-registration",
            get(franchisor::registration_status),
        )
        .route("/franchisor/franchises", post(franchisor::create_franchise))
        .route("/franchises", post(franchisor::create_franchise))
        // Role landing pages
        .route("/franchisee/my-tasks", get(dashboards::my_tasks))
        .route(
            "/franchisor/royalty-management",
            get(dashboards::royalty_management),
        )
        .route("/sales/leads", get(dashboards::sales_leads))
        .route("/broker/listings", get(dashboards::broker_listings))
        .route_layer(from_fn_with_state(state.clone(), registration_gate))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
