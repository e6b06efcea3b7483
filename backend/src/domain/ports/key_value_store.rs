//! Port for the key/value persistence primitive underneath the tables.
//!
//! Each key holds one whole serialised value; callers read and write it in
//! full. Adapters decide how values are kept (memory, files, something
//! else) and may add their own locking without changing these signatures.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by key/value store adapters.
    pub enum KeyValueStoreError {
        /// The backing store could not be reached at all.
        Unavailable { message: String } => "key/value store unavailable: {message}",
        /// Reading or writing one key failed.
        Io { key: String, message: String } => "key/value store failed for {key}: {message}",
    }
}

/// Whole-value get/set/remove over string keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueStoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError>;
}
