//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed domain entities used by the services and
//! persistence adapters. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport agnostic failure payload.
//! - User, Message, ConversationKey, Chat, Session: chat data model.
//! - AccountService, MessagingService, ChatListService: services that
//!   implement the driving ports in [`ports`].

pub mod account_service;
pub mod auth;
pub mod chat;
pub mod chat_list_service;
pub mod error;
pub mod message;
pub mod messaging_service;
pub mod ports;
pub mod session;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordCheck, Registration};
pub use self::chat::{Chat, sort_by_recency};
pub use self::chat_list_service::ChatListService;
pub use self::error::{Error, ErrorCode};
pub use self::message::{
    CONVERSATION_SEPARATOR, ConversationKey, Message, MessageDraft, MessageId,
    MessageRecordError, MessageTable, MessageText, MessageValidationError, Timestamp,
};
pub use self::messaging_service::MessagingService;
pub use self::session::Session;
pub use self::user::{
    Avatar, Email, ServerTag, User, UserDraft, UserId, UserValidationError, Username,
};
