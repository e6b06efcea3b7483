//! Dependency bundle for the polling views.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{ChatsQuery, MessageCommand, MessageQuery};

use super::scheduler::Scheduler;

/// Default delay between conversation refreshes.
pub const DEFAULT_THREAD_INTERVAL: Duration = Duration::from_millis(1000);
/// Default delay between chat list refreshes.
pub const DEFAULT_CHAT_LIST_INTERVAL: Duration = Duration::from_millis(3000);

/// How often each view re-fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// Delay between refreshes of an open conversation.
    pub thread: Duration,
    /// Delay between refreshes of the chat list.
    pub chat_list: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            thread: DEFAULT_THREAD_INTERVAL,
            chat_list: DEFAULT_CHAT_LIST_INTERVAL,
        }
    }
}

/// Parameter object bundling the ports and scheduler the views depend on.
#[derive(Clone)]
pub struct SyncPorts {
    pub messages: Arc<dyn MessageQuery>,
    pub sender: Arc<dyn MessageCommand>,
    pub chats: Arc<dyn ChatsQuery>,
    pub scheduler: Arc<dyn Scheduler>,
    pub intervals: PollIntervals,
}

