//! Message store service.
//!
//! Implements `MessageCommand` and `MessageQuery` over a whole-table
//! [`MessageRepository`]. Timestamps come from the injected clock.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::message::MessageDraft;
use crate::domain::ports::{
    MessageCommand, MessageQuery, MessageRepository, MessageRepositoryError,
};
use crate::domain::{
    ConversationKey, Error, Message, MessageId, MessageText, Timestamp, UserId,
};

pub(super) fn map_message_repository_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Storage { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Encoding { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

/// Messaging service backed by the messages table.
///
/// Appends are serialised by a write gate shared between clones. Within one
/// conversation, timestamps never go backwards: a clock reading earlier than
/// the newest stored message is raised to that message's timestamp.
#[derive(Clone)]
pub struct MessagingService<R> {
    messages: Arc<R>,
    clock: Arc<dyn Clock>,
    write_gate: Arc<Mutex<()>>,
}

impl<R> MessagingService<R> {
    /// Create a new service over the messages table.
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use chat_backend::domain::MessagingService;
    /// # use chat_backend::outbound::persistence::KeyValueMessageRepository;
    /// # use chat_backend::outbound::storage::InMemoryKeyValueStore;
    /// # use mockable::DefaultClock;
    /// let store = Arc::new(InMemoryKeyValueStore::new());
    /// let service = MessagingService::new(
    ///     Arc::new(KeyValueMessageRepository::new(store)),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(messages: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            messages,
            clock,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.clock.utc().timestamp_millis())
    }
}

#[async_trait]
impl<R> MessageCommand for MessagingService<R>
where
    R: MessageRepository,
{
    async fn append(
        &self,
        sender: &UserId,
        receiver: &UserId,
        text: &str,
    ) -> Result<Message, Error> {
        let text = MessageText::new(text)
            .map_err(|err| Error::invalid_request(format!("invalid message: {err}")))?;

        let _gate = self.write_gate.lock().await;
        let mut table = self
            .messages
            .load()
            .await
            .map_err(map_message_repository_error)?;

        let key = ConversationKey::between(sender, receiver);
        let now = self.now();
        let timestamp = table
            .last_timestamp(&key)
            .map_or(now, |last| last.max(now));
        let message = Message::new(MessageDraft {
            id: MessageId::random(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            text,
            timestamp,
        });
        table.append(message.clone());
        self.messages
            .save(&table)
            .await
            .map_err(map_message_repository_error)?;

        debug!(
            message_id = %message.id(),
            conversation = %key,
            timestamp = %timestamp,
            "appended message"
        );
        Ok(message)
    }
}

#[async_trait]
impl<R> MessageQuery for MessagingService<R>
where
    R: MessageRepository,
{
    async fn history(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, Error> {
        let table = self
            .messages
            .load()
            .await
            .map_err(map_message_repository_error)?;
        Ok(table.history(&ConversationKey::between(a, b)).to_vec())
    }
}

#[cfg(test)]
#[path = "messaging_service_tests.rs"]
mod tests;
