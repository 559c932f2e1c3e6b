//! Response cache for upstream character data.
//!
//! Entries carry a logical TTL but are never dropped on expiry alone: an
//! expired entry stays readable through the stale accessors until LRU
//! capacity pushes it out. The gateway uses that window to serve degraded
//! responses while the upstream is down.

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{batch_key, page_key};
pub use store::CharacterCache;
