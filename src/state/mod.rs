//! Internal state persisted between runs.

pub mod store;

pub use store::{CacheStore, CommandEntry, CACHE_FILE};
