//! Chat aggregator: the per-user conversation list.
//!
//! A pure read-side projection over the users and messages tables. Nothing
//! here is stored.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::account_service::map_user_repository_error;
use crate::domain::messaging_service::map_message_repository_error;
use crate::domain::ports::{ChatsQuery, MessageRepository, UserRepository};
use crate::domain::{Chat, Error, UserId, sort_by_recency};

/// Chat list service implementing [`ChatsQuery`].
#[derive(Clone)]
pub struct ChatListService<U, M> {
    users: Arc<U>,
    messages: Arc<M>,
}

impl<U, M> ChatListService<U, M> {
    /// Create a new service over both tables.
    pub fn new(users: Arc<U>, messages: Arc<M>) -> Self {
        Self { users, messages }
    }
}

#[async_trait]
impl<U, M> ChatsQuery for ChatListService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn chats_for(&self, user: &UserId) -> Result<Vec<Chat>, Error> {
        let table = self
            .messages
            .load()
            .await
            .map_err(map_message_repository_error)?;
        let users = self
            .users
            .load_all()
            .await
            .map_err(map_user_repository_error)?;

        let mut seen = HashSet::new();
        let mut chats = Vec::new();
        for (key, messages) in table.iter() {
            let Some(contact_id) = key.counterpart_of(user) else {
                continue;
            };
            if !seen.insert(contact_id.clone()) {
                continue;
            }
            let Some(contact) = users.iter().find(|candidate| candidate.id() == &contact_id)
            else {
                debug!(contact_id = %contact_id, conversation = %key, "skipping unknown contact");
                continue;
            };
            chats.push(Chat::new(contact.clone(), messages.last().cloned()));
        }

        sort_by_recency(&mut chats);
        Ok(chats)
    }
}
