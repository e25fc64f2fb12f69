pub mod session;

pub use session::{current_user, logout};
