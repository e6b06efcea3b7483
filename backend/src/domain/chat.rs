//! Chat list entries: a contact paired with the newest message exchanged.

use serde::Serialize;

use super::message::{Message, Timestamp};
use super::user::User;

/// One row of a user's chat list. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    contact: User,
    last_message: Option<Message>,
}

impl Chat {
    /// Pair `contact` with the newest message exchanged with them, if any.
    pub fn new(contact: User, last_message: Option<Message>) -> Self {
        Self {
            contact,
            last_message,
        }
    }

    /// The other participant.
    pub fn contact(&self) -> &User {
        &self.contact
    }

    /// Newest message in the conversation, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    fn recency(&self) -> Option<Timestamp> {
        self.last_message.as_ref().map(Message::timestamp)
    }
}

/// Order chats newest first; chats without messages go last.
///
/// The sort is stable, so equal timestamps keep their incoming order.
pub fn sort_by_recency(chats: &mut [Chat]) {
    chats.sort_by(|left, right| right.recency().cmp(&left.recency()));
}
