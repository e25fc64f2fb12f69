// handlers/protected/mod.rs - handlers that require an authenticated user
//
// Every route here runs behind require_auth followed by registration_gate.

pub mod auth;
pub mod dashboards;
pub mod franchisor;
pub mod onboarding;
