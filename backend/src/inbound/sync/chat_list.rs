//! Chat list view: the session user's conversations, kept fresh by polling.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::domain::ports::ChatsQuery;
use crate::domain::{Chat, Message, MessageId, Session, UserId};

use super::ports::SyncPorts;
use super::scheduler::{PollHandle, PollTask};

#[derive(Debug, Default)]
struct ListState {
    chats: Vec<Chat>,
    closed: bool,
}

fn newest_message_id(chats: &[Chat]) -> Option<&MessageId> {
    chats.first().and_then(Chat::last_message).map(Message::id)
}

/// Shared state and fetch logic behind a [`ChatListView`].
///
/// Cloned into the poll task and handed to conversations so a send can
/// refresh the list without waiting for the next tick.
#[derive(Clone)]
pub struct ChatListRefresher {
    state: Arc<Mutex<ListState>>,
    chats: Arc<dyn ChatsQuery>,
    user: UserId,
}

impl ChatListRefresher {
    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }

    async fn fetch(&self) -> Option<Vec<Chat>> {
        if self.is_closed() {
            return None;
        }
        match self.chats.chats_for(&self.user).await {
            Ok(chats) => Some(chats),
            Err(error) => {
                warn!(user_id = %self.user, %error, "chat list refresh failed");
                None
            }
        }
    }

    /// Poll tick: replace the list when its length or first entry changed.
    async fn poll(&self) {
        let Some(fetched) = self.fetch().await else {
            return;
        };
        let mut state = self.lock();
        if state.closed {
            return;
        }
        let changed = fetched.len() != state.chats.len()
            || newest_message_id(&fetched) != newest_message_id(&state.chats);
        if changed {
            debug!(user_id = %self.user, chats = fetched.len(), "chat list changed");
            state.chats = fetched;
        }
    }

    /// Fetch now and replace the list unconditionally.
    ///
    /// Failures are logged and leave the list as it was.
    pub async fn force_refresh(&self) {
        let Some(fetched) = self.fetch().await else {
            return;
        };
        let mut state = self.lock();
        if !state.closed {
            state.chats = fetched;
        }
    }

    fn close(&self) {
        self.lock().closed = true;
    }
}

/// Polling view over [`ChatsQuery::chats_for`] for one session.
pub struct ChatListView {
    refresher: ChatListRefresher,
    poll: PollHandle,
}

impl ChatListView {
    /// Fetch the list now, then re-fetch every chat list interval.
    pub async fn open(ports: &SyncPorts, session: &Session) -> Self {
        let refresher = ChatListRefresher {
            state: Arc::new(Mutex::new(ListState::default())),
            chats: Arc::clone(&ports.chats),
            user: session.user_id().clone(),
        };
        refresher.force_refresh().await;

        let ticker = refresher.clone();
        let task: PollTask = Arc::new(move || {
            let ticker = ticker.clone();
            async move { ticker.poll().await }.boxed()
        });
        let poll = ports.scheduler.every(ports.intervals.chat_list, task);
        debug!(user_id = %session.user_id(), "opened chat list");
        Self { refresher, poll }
    }

    /// Current local list, newest first.
    pub fn chats(&self) -> Vec<Chat> {
        self.refresher.lock().chats.clone()
    }

    /// Fetch now and replace the list unconditionally.
    pub async fn force_refresh(&self) {
        self.refresher.force_refresh().await;
    }

    /// Handle other views use to force a refresh of this list.
    pub fn refresher(&self) -> ChatListRefresher {
        self.refresher.clone()
    }

    /// Stop polling. The list never changes after this.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ChatListView {
    fn drop(&mut self) {
        self.refresher.close();
        self.poll.cancel();
    }
}

#[cfg(test)]
#[path = "chat_list_tests.rs"]
mod tests;
