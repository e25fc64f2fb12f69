pub mod auth;
pub mod system;

pub use system::{health, root};
