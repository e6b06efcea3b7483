//! Driving port for reading conversation history.

use async_trait::async_trait;

use crate::domain::{Error, Message, UserId};

/// Domain use-case port for reading one conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQuery: Send + Sync {
    /// Every message between `a` and `b` in append order; empty when they
    /// have never talked.
    async fn history(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, Error>;
}
