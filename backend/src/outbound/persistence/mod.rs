//! Table adapters over a [`KeyValueStore`].
//!
//! Each table is one JSON document under a fixed key:
//!
//! - [`USERS_KEY`]: JSON array of users, in registration order.
//! - [`MESSAGES_KEY`]: JSON object mapping conversation keys to message
//!   arrays, in creation order.
//! - [`SESSION_KEY`]: the current user, or absent when logged out.
//!
//! A document that does not parse is treated as an empty table: the entry is
//! removed and a warning logged, and the next write starts afresh. Adapters
//! contain no business logic.
//!
//! [`KeyValueStore`]: crate::domain::ports::KeyValueStore

mod json_document;
mod key_value_message_repository;
mod key_value_session_store;
mod key_value_user_repository;

pub use key_value_message_repository::KeyValueMessageRepository;
pub use key_value_session_store::KeyValueSessionStore;
pub use key_value_user_repository::KeyValueUserRepository;

/// Key holding the users table.
pub const USERS_KEY: &str = "chat_app_users";
/// Key holding the messages table.
pub const MESSAGES_KEY: &str = "chat_app_messages";
/// Key holding the current session.
pub const SESSION_KEY: &str = "chat_app_current_user";

#[cfg(test)]
mod tests;
