//! Port for the persisted current-user session.

use async_trait::async_trait;

use crate::domain::Session;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The underlying store could not be read or written.
        Storage { message: String } => "session store storage failed: {message}",
        /// The session could not be encoded for storage.
        Encoding { message: String } => "session store encoding failed: {message}",
    }
}

/// Persistence for the single current session of this client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored session. A corrupt entry is cleared and reads as `None`.
    async fn load(&self) -> Result<Option<Session>, SessionStoreError>;

    /// Persist `session`, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Forget the stored session.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}
