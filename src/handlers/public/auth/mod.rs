// handlers/public/auth/mod.rs - token acquisition

pub mod login; // POST /auth/login - authenticate and receive token + ability rules

pub use login::login_post;
