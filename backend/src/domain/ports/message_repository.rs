//! Port for the messages table.

use async_trait::async_trait;

use crate::domain::MessageTable;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// The underlying store could not be read or written.
        Storage { message: String } => "message repository storage failed: {message}",
        /// The table could not be encoded for storage.
        Encoding { message: String } => "message repository encoding failed: {message}",
    }
}

/// Whole-table access to every conversation log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Load the table. A missing or corrupt table loads as empty.
    async fn load(&self) -> Result<MessageTable, MessageRepositoryError>;

    /// Replace the whole table.
    async fn save(&self, table: &MessageTable) -> Result<(), MessageRepositoryError>;
}
