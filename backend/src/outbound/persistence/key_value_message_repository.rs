//! Messages table stored as one JSON object.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::MessageTable;
use crate::domain::ports::{KeyValueStore, MessageRepository, MessageRepositoryError};

use super::MESSAGES_KEY;
use super::json_document::{self, DocumentError};

fn map_document_error(error: DocumentError) -> MessageRepositoryError {
    match error {
        DocumentError::Store(err) => MessageRepositoryError::storage(err.to_string()),
        DocumentError::Encode(err) => MessageRepositoryError::encoding(err.to_string()),
    }
}

/// [`MessageRepository`] adapter over a key/value store.
#[derive(Clone)]
pub struct KeyValueMessageRepository<S> {
    store: Arc<S>,
}

impl<S> KeyValueMessageRepository<S> {
    /// Keep the messages table in `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> MessageRepository for KeyValueMessageRepository<S>
where
    S: KeyValueStore,
{
    async fn load(&self) -> Result<MessageTable, MessageRepositoryError> {
        json_document::load(self.store.as_ref(), MESSAGES_KEY)
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_document_error)
    }

    async fn save(&self, table: &MessageTable) -> Result<(), MessageRepositoryError> {
        json_document::save(self.store.as_ref(), MESSAGES_KEY, table)
            .await
            .map_err(map_document_error)
    }
}
