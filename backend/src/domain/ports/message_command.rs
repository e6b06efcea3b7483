//! Driving port for sending messages.

use async_trait::async_trait;

use crate::domain::{Error, Message, UserId};

/// Domain use-case port for appending to a conversation.
#[async_trait]
pub trait MessageCommand: Send + Sync {
    /// Append `text` from `sender` to `receiver` and return the stored record.
    ///
    /// Blank text is rejected as an invalid request.
    async fn append(&self, sender: &UserId, receiver: &UserId, text: &str)
    -> Result<Message, Error>;
}
