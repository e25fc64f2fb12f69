// handlers/mod.rs - HTTP handlers grouped by access level
//
// public/    - no token required (login, service info, health)
// protected/ - behind require_auth and the registration gates

pub mod protected;
pub mod public;
