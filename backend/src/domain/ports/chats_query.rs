//! Driving port for a user's chat list.

use async_trait::async_trait;

use crate::domain::{Chat, Error, UserId};

/// Domain use-case port for the per-user conversation list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatsQuery: Send + Sync {
    /// Conversations `user` takes part in, newest first, with empty
    /// conversations last.
    async fn chats_for(&self, user: &UserId) -> Result<Vec<Chat>, Error>;
}
