pub mod login;
pub mod registration;

pub use login::{AuthError, LockoutPolicy, LoginOutcome, LoginService};
pub use registration::{RegistrationError, RegistrationService};
