//! State storage module
//!
//! Provides private, app-scoped persistent storage for session blobs.
//! The session manager is the only component expected to touch it.

mod file_store;
mod memory_store;
pub mod store_trait;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use store_trait::StateStore;
