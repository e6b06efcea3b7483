//! Key/value store adapters implementing [`KeyValueStore`].
//!
//! - [`InMemoryKeyValueStore`]: process-local map, used by tests and demos.
//! - [`DirectoryKeyValueStore`]: one JSON file per key inside a
//!   capability-scoped directory.
//!
//! [`KeyValueStore`]: crate::domain::ports::KeyValueStore

mod directory;
mod memory;

pub use directory::DirectoryKeyValueStore;
pub use memory::InMemoryKeyValueStore;
