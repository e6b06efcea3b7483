//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`AccountCommand`, `LoginService`, `UsersQuery`,
//! `MessageCommand`, `MessageQuery`, `ChatsQuery`) are implemented by the
//! domain services. Driven ports (`KeyValueStore`, `UserRepository`,
//! `MessageRepository`, `SessionStore`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod chats_query;
mod key_value_store;
mod login_service;
mod message_command;
mod message_query;
mod message_repository;
mod session_store;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use chats_query::MockChatsQuery;
pub use chats_query::ChatsQuery;
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use message_command::MessageCommand;
#[cfg(test)]
pub use message_query::MockMessageQuery;
pub use message_query::MessageQuery;
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
pub use users_query::UsersQuery;
