//! Conversation view: one thread, kept fresh by polling.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::domain::ports::{MessageCommand, MessageQuery};
use crate::domain::{Error, Message, Session, User, UserId};

use super::chat_list::ChatListRefresher;
use super::ports::SyncPorts;
use super::scheduler::{PollHandle, PollTask};

#[derive(Debug, Default)]
struct ThreadState {
    messages: Vec<Message>,
    closed: bool,
}

#[derive(Clone)]
struct ThreadFetcher {
    state: Arc<Mutex<ThreadState>>,
    history: Arc<dyn MessageQuery>,
    me: UserId,
    contact: UserId,
}

impl ThreadFetcher {
    fn lock(&self) -> MutexGuard<'_, ThreadState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Fetch the history and keep it unless it is shorter than local state.
    async fn refresh(&self) {
        if self.lock().closed {
            return;
        }
        let fetched = match self.history.history(&self.me, &self.contact).await {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(contact_id = %self.contact, %error, "conversation refresh failed");
                return;
            }
        };
        let mut state = self.lock();
        if state.closed {
            return;
        }
        if fetched.len() >= state.messages.len() {
            state.messages = fetched;
        } else {
            debug!(
                contact_id = %self.contact,
                fetched = fetched.len(),
                local = state.messages.len(),
                "kept longer local history"
            );
        }
    }

    fn splice(&self, message: Message) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        if !state.messages.iter().any(|known| known.id() == message.id()) {
            state.messages.push(message);
        }
    }
}

/// Polling view over one conversation between the session user and a
/// contact.
pub struct ConversationView {
    fetcher: ThreadFetcher,
    sender: Arc<dyn MessageCommand>,
    contact: User,
    chat_list: Option<ChatListRefresher>,
    poll: PollHandle,
}

impl ConversationView {
    /// Fetch the history now, then re-fetch every thread interval.
    ///
    /// When `chat_list` is given, each successful send forces it to refresh.
    pub async fn open(
        ports: &SyncPorts,
        session: &Session,
        contact: User,
        chat_list: Option<ChatListRefresher>,
    ) -> Self {
        let fetcher = ThreadFetcher {
            state: Arc::new(Mutex::new(ThreadState::default())),
            history: Arc::clone(&ports.messages),
            me: session.user_id().clone(),
            contact: contact.id().clone(),
        };
        fetcher.refresh().await;

        let ticker = fetcher.clone();
        let task: PollTask = Arc::new(move || {
            let ticker = ticker.clone();
            async move { ticker.refresh().await }.boxed()
        });
        let poll = ports.scheduler.every(ports.intervals.thread, task);
        debug!(contact_id = %contact.id(), "opened conversation");

        Self {
            fetcher,
            sender: Arc::clone(&ports.sender),
            contact,
            chat_list,
            poll,
        }
    }

    /// The other participant.
    pub fn contact(&self) -> &User {
        &self.contact
    }

    /// Current local history, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.fetcher.lock().messages.clone()
    }

    /// Send `text` to the contact.
    ///
    /// Blank text is rejected before anything is stored. On success the
    /// stored message is appended to local state straight away and the
    /// linked chat list is refreshed.
    pub async fn send(&self, text: &str) -> Result<Message, Error> {
        if text.trim().is_empty() {
            return Err(Error::invalid_request("message text must not be blank"));
        }
        let message = self
            .sender
            .append(&self.fetcher.me, &self.fetcher.contact, text)
            .await?;
        self.fetcher.splice(message.clone());
        if let Some(chat_list) = &self.chat_list {
            chat_list.force_refresh().await;
        }
        Ok(message)
    }

    /// Stop polling. The history never changes after this.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ConversationView {
    fn drop(&mut self) {
        self.fetcher.lock().closed = true;
        self.poll.cancel();
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
