//! Runtime configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::sync::PollIntervals;

const DEFAULT_DATA_DIR: &str = "chat-data";

/// Settings for the chat backend: where documents live and how often the
/// polling views re-fetch.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHAT")]
pub struct ChatSettings {
    /// Directory holding the persisted documents.
    pub data_dir: Option<PathBuf>,
    /// Delay between conversation refreshes, in milliseconds.
    #[ortho_config(default = 1000)]
    pub thread_poll_interval_ms: u64,
    /// Delay between chat list refreshes, in milliseconds.
    #[ortho_config(default = 3000)]
    pub chat_list_poll_interval_ms: u64,
}

impl ChatSettings {
    /// Return the configured data directory, falling back to the default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Poll intervals for the sync views. Zero is raised to one millisecond.
    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            thread: Duration::from_millis(self.thread_poll_interval_ms.max(1)),
            chat_list: Duration::from_millis(self.chat_list_poll_interval_ms.max(1)),
        }
    }
}
