//! Directory-backed key/value store.
//!
//! Each key maps to `<key>.json` inside one directory opened through
//! `cap_std`, so the adapter cannot reach outside it. Writes go to a
//! uniquely named temporary sibling first and are renamed into place.
//! File I/O runs on Tokio's blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

const VALUE_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = "tmp";

#[derive(Debug)]
struct Shared {
    dir: Dir,
    io_gate: Mutex<()>,
}

/// File-per-key store rooted at one directory.
#[derive(Debug)]
pub struct DirectoryKeyValueStore {
    root: PathBuf,
    shared: Arc<Shared>,
}

impl DirectoryKeyValueStore {
    /// Open (creating if needed) the directory at `root`.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use chat_backend::outbound::storage::DirectoryKeyValueStore;
    ///
    /// let store = DirectoryKeyValueStore::open("/tmp/chat-data")?;
    /// assert!(store.root().ends_with("chat-data"));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        debug!(root = %root.display(), "opened directory store");
        Ok(Self {
            root: root.to_path_buf(),
            shared: Arc::new(Shared {
                dir,
                io_gate: Mutex::new(()),
            }),
        })
    }

    /// Directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `op` against the directory on the blocking pool, holding the gate.
    async fn blocking<T, F>(&self, op: F) -> Result<T, KeyValueStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, KeyValueStoreError> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let _gate = shared
                .io_gate
                .lock()
                .map_err(|_| KeyValueStoreError::unavailable("directory store lock poisoned"))?;
            op(&shared.dir)
        })
        .await
        .map_err(|error| {
            KeyValueStoreError::unavailable(format!("directory store task failed: {error}"))
        })?
    }
}

fn file_name(key: &str) -> Result<String, KeyValueStoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(KeyValueStoreError::io(
            key,
            "keys may only contain ASCII letters, digits, '_' and '-'",
        ));
    }
    Ok(format!("{key}.{VALUE_EXTENSION}"))
}

/// Temporary sibling for one write; unique across processes and writes.
fn temp_name(name: &str) -> String {
    format!(
        "{name}.{}.{}.{TEMP_SUFFIX}",
        std::process::id(),
        Uuid::new_v4().simple()
    )
}

fn io_error(key: &str, error: &io::Error) -> KeyValueStoreError {
    KeyValueStoreError::io(key, error.to_string())
}

#[async_trait]
impl KeyValueStore for DirectoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let name = file_name(key)?;
        let key = key.to_owned();
        self.blocking(move |dir| match dir.read_to_string(&name) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(&key, &error)),
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueStoreError> {
        let name = file_name(key)?;
        let temp = temp_name(&name);
        let key = key.to_owned();
        self.blocking(move |dir| {
            dir.write(&temp, value.as_bytes())
                .map_err(|error| io_error(&key, &error))?;
            dir.rename(&temp, dir, &name).map_err(|error| {
                // Best effort; the rename error is what the caller needs.
                let _ = dir.remove_file(&temp);
                io_error(&key, &error)
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        let name = file_name(key)?;
        let key = key.to_owned();
        self.blocking(move |dir| match dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&key, &error)),
        })
        .await
    }
}
