//! Port abstraction for the users table and its errors.
//!
//! The table is read and written as a whole; services do their own
//! read-modify-write under a write gate.

use async_trait::async_trait;

use crate::domain::User;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// The underlying store could not be read or written.
        Storage { message: String } => "user repository storage failed: {message}",
        /// The table could not be encoded for storage.
        Encoding { message: String } => "user repository encoding failed: {message}",
    }
}

/// Whole-table access to registered users, in registration order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load every user. A missing or corrupt table loads as empty.
    async fn load_all(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Replace the whole table.
    async fn save_all(&self, users: &[User]) -> Result<(), UserRepositoryError>;
}
