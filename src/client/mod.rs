//! Client side of the ability model: the persisted rule cache and the
//! navigation and route checks that read it.

pub mod ability_cache;
pub mod navigation;
pub mod router;
pub mod session;
pub mod storage;

pub use ability_cache::{AbilityCache, ABILITY_RULES_KEY};
pub use navigation::{default_menu, filter_items, visible_items, NavItem};
pub use router::{guard, RouteDecision, RouteMeta};
pub use session::ClientSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
