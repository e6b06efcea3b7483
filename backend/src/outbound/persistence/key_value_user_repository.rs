//! Users table stored as one JSON array.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::User;
use crate::domain::ports::{KeyValueStore, UserRepository, UserRepositoryError};

use super::USERS_KEY;
use super::json_document::{self, DocumentError};

fn map_document_error(error: DocumentError) -> UserRepositoryError {
    match error {
        DocumentError::Store(err) => UserRepositoryError::storage(err.to_string()),
        DocumentError::Encode(err) => UserRepositoryError::encoding(err.to_string()),
    }
}

/// [`UserRepository`] adapter over a key/value store.
#[derive(Clone)]
pub struct KeyValueUserRepository<S> {
    store: Arc<S>,
}

impl<S> KeyValueUserRepository<S> {
    /// Keep the users table in `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> UserRepository for KeyValueUserRepository<S>
where
    S: KeyValueStore,
{
    async fn load_all(&self) -> Result<Vec<User>, UserRepositoryError> {
        json_document::load(self.store.as_ref(), USERS_KEY)
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_document_error)
    }

    async fn save_all(&self, users: &[User]) -> Result<(), UserRepositoryError> {
        json_document::save(self.store.as_ref(), USERS_KEY, users)
            .await
            .map_err(map_document_error)
    }
}
