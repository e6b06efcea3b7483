//! Current session stored as one JSON user record.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Session;
use crate::domain::ports::{KeyValueStore, SessionStore, SessionStoreError};

use super::SESSION_KEY;
use super::json_document::{self, DocumentError};

fn map_document_error(error: DocumentError) -> SessionStoreError {
    match error {
        DocumentError::Store(err) => SessionStoreError::storage(err.to_string()),
        DocumentError::Encode(err) => SessionStoreError::encoding(err.to_string()),
    }
}

/// [`SessionStore`] adapter over a key/value store.
#[derive(Clone)]
pub struct KeyValueSessionStore<S> {
    store: Arc<S>,
}

impl<S> KeyValueSessionStore<S> {
    /// Keep the current session in `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> SessionStore for KeyValueSessionStore<S>
where
    S: KeyValueStore,
{
    async fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        json_document::load(self.store.as_ref(), SESSION_KEY)
            .await
            .map_err(map_document_error)
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        json_document::save(self.store.as_ref(), SESSION_KEY, session)
            .await
            .map_err(map_document_error)
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.store
            .remove(SESSION_KEY)
            .await
            .map_err(|err| SessionStoreError::storage(err.to_string()))
    }
}
