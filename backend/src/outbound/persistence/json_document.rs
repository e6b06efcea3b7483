//! Shared JSON load/store helpers for the table adapters.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Failure while reading or writing one JSON document.
#[derive(Debug)]
pub(super) enum DocumentError {
    Store(KeyValueStoreError),
    Encode(serde_json::Error),
}

/// Read and decode the document at `key`.
///
/// Absent documents read as `None`. Corrupt documents are removed, logged,
/// and also read as `None`.
pub(super) async fn load<S, T>(store: &S, key: &str) -> Result<Option<T>, DocumentError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await.map_err(DocumentError::Store)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            warn!(key, %error, "discarding corrupt stored document");
            if let Err(remove_error) = store.remove(key).await {
                warn!(key, error = %remove_error, "failed to remove corrupt stored document");
            }
            Ok(None)
        }
    }
}

/// Encode `value` and replace the document at `key`.
pub(super) async fn save<S, T>(store: &S, key: &str, value: &T) -> Result<(), DocumentError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(DocumentError::Encode)?;
    store.set(key, raw).await.map_err(DocumentError::Store)
}
