//! Document persistence: JSON codec with legacy backfill, file store, in-memory store.

pub mod codec;
pub mod json_store;
pub mod memory_store;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
