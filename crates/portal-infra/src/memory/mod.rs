//! In-memory persistence - used as fallback when no database is configured.

mod store;

pub use store::InMemoryStore;
