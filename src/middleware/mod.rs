pub mod auth;
pub mod gate;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use gate::{registration_gate, wants_json};
pub use response::{ApiResponse, ApiResult};
