pub mod abilities;
pub mod auth;
pub mod nav;
pub mod password;
