pub mod franchise;
pub mod user;

pub use franchise::{Franchise, OnboardingProfile};
pub use user::{LoginState, User, UserSummary};
