pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use seed::{seed_demo_users, SeedError};
pub use store::{Session, StoreError, StoreResult, UserStore};
