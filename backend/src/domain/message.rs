//! Message data model and the conversation table.
//!
//! Messages are immutable and append-only. Every message between two people
//! lives under one [`ConversationKey`], derived from the unordered pair of
//! participant ids, so `key(a, b) == key(b, a)`.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::user::UserId;

/// Fixed separator joining the two sorted participant ids of a conversation.
pub const CONVERSATION_SEPARATOR: &str = "__CHAT_WITH__";

/// Validation errors returned by the message value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    /// The message id was empty.
    EmptyId,
    /// The text was empty or only whitespace.
    BlankText,
}

impl fmt::Display for MessageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "message id must not be empty"),
            Self::BlankText => write!(f, "message text must not be blank"),
        }
    }
}

impl std::error::Error for MessageValidationError {}

/// Key of one conversation log.
///
/// Keys built with [`ConversationKey::between`] always parse back into their
/// two participants. Keys read from storage are kept verbatim even when they
/// do not parse; readers skip those.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Derive the key for the unordered pair `{a, b}`.
    ///
    /// # Examples
    /// ```
    /// use chat_backend::domain::{ConversationKey, UserId};
    ///
    /// let a = UserId::new("alice-id").unwrap();
    /// let b = UserId::new("bob-id").unwrap();
    /// assert_eq!(ConversationKey::between(&a, &b), ConversationKey::between(&b, &a));
    /// assert_eq!(
    ///     ConversationKey::between(&a, &b).as_str(),
    ///     "alice-id__CHAT_WITH__bob-id"
    /// );
    /// ```
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{first}{CONVERSATION_SEPARATOR}{second}"))
    }

    /// Wrap a key read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Split the key into its two participants, if it is well formed.
    pub fn participants(&self) -> Option<(UserId, UserId)> {
        let mut parts = self.0.split(CONVERSATION_SEPARATOR);
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((UserId::new(first).ok()?, UserId::new(second).ok()?))
    }

    /// The participant that is not `user`, when `user` takes part.
    ///
    /// A conversation with oneself yields `user` again.
    pub fn counterpart_of(&self, user: &UserId) -> Option<UserId> {
        let (first, second) = self.participants()?;
        if &first == user {
            Some(second)
        } else if &second == user {
            Some(first)
        } else {
            None
        }
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Validate and construct a [`MessageId`].
    pub fn new(id: impl Into<String>) -> Result<Self, MessageValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MessageValidationError::EmptyId);
        }
        Ok(Self(id))
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(format!("msg-{}", Uuid::new_v4()))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageId> for String {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = MessageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Message body. Must contain something other than whitespace; the text is
/// otherwise stored exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageText(String);

impl MessageText {
    /// Validate and construct a [`MessageText`].
    pub fn new(text: impl Into<String>) -> Result<Self, MessageValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MessageValidationError::BlankText);
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<MessageText> for String {
    fn from(value: MessageText) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = MessageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a millisecond count.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Millisecond count.
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated components used to assemble a [`Message`].
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// The other participant.
    pub receiver_id: UserId,
    pub text: MessageText,
    /// Milliseconds since the Unix epoch at which the message was stored.
    pub timestamp: Timestamp,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MessageDto", into = "MessageDto")]
pub struct Message {
    id: MessageId,
    sender_id: UserId,
    receiver_id: UserId,
    text: MessageText,
    timestamp: Timestamp,
}

impl Message {
    /// Build a message from validated components.
    pub fn new(draft: MessageDraft) -> Self {
        let MessageDraft {
            id,
            sender_id,
            receiver_id,
            text,
            timestamp,
        } = draft;
        Self {
            id,
            sender_id,
            receiver_id,
            text,
            timestamp,
        }
    }

    /// Unique message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Who wrote the message.
    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    /// Who the message was sent to.
    pub fn receiver_id(&self) -> &UserId {
        &self.receiver_id
    }

    /// Message body, never blank.
    pub fn text(&self) -> &MessageText {
        &self.text
    }

    /// When the message was stored.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Conversation this message belongs to.
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::between(&self.sender_id, &self.receiver_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    id: String,
    sender_id: String,
    receiver_id: String,
    text: String,
    timestamp: i64,
}

/// Errors raised when a stored message record is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRecordError {
    /// The id or text failed validation.
    Message(MessageValidationError),
    /// The sender or receiver id failed validation.
    Participant(super::user::UserValidationError),
}

impl fmt::Display for MessageRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(err) => err.fmt(f),
            Self::Participant(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for MessageRecordError {}

impl From<Message> for MessageDto {
    fn from(value: Message) -> Self {
        Self {
            id: value.id.into(),
            sender_id: value.sender_id.into(),
            receiver_id: value.receiver_id.into(),
            text: value.text.into(),
            timestamp: value.timestamp.as_millis(),
        }
    }
}

impl TryFrom<MessageDto> for Message {
    type Error = MessageRecordError;

    fn try_from(value: MessageDto) -> Result<Self, Self::Error> {
        Ok(Message::new(MessageDraft {
            id: MessageId::new(value.id).map_err(MessageRecordError::Message)?,
            sender_id: UserId::try_from(value.sender_id).map_err(MessageRecordError::Participant)?,
            receiver_id: UserId::try_from(value.receiver_id)
                .map_err(MessageRecordError::Participant)?,
            text: MessageText::new(value.text).map_err(MessageRecordError::Message)?,
            timestamp: Timestamp::from_millis(value.timestamp),
        }))
    }
}

/// Every conversation log, keyed by [`ConversationKey`].
///
/// Iteration follows the order in which conversations were first created,
/// and each log keeps append order. Serialised as a JSON object whose member
/// order is that same creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    conversations: Vec<(ConversationKey, Vec<Message>)>,
    index: HashMap<ConversationKey, usize>,
}

impl MessageTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &ConversationKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn push_log(&mut self, key: ConversationKey, messages: Vec<Message>) {
        self.index.insert(key.clone(), self.conversations.len());
        self.conversations.push((key, messages));
    }

    /// Messages stored under `key`, oldest first. Empty when absent.
    pub fn history(&self, key: &ConversationKey) -> &[Message] {
        self.position(key)
            .and_then(|index| self.conversations.get(index))
            .map_or(&[], |(_, messages)| messages.as_slice())
    }

    /// Timestamp of the newest message under `key`.
    pub fn last_timestamp(&self, key: &ConversationKey) -> Option<Timestamp> {
        self.history(key).last().map(Message::timestamp)
    }

    /// Append `message` to its conversation, creating the log if needed.
    pub fn append(&mut self, message: Message) {
        let key = message.conversation_key();
        match self.position(&key) {
            Some(index) => {
                if let Some((_, messages)) = self.conversations.get_mut(index) {
                    messages.push(message);
                }
            }
            None => self.push_log(key, vec![message]),
        }
    }

    /// Replace (or create) the log stored under `key`.
    pub fn insert(&mut self, key: ConversationKey, messages: Vec<Message>) {
        match self.position(&key) {
            Some(index) => {
                if let Some((_, existing)) = self.conversations.get_mut(index) {
                    *existing = messages;
                }
            }
            None => self.push_log(key, messages),
        }
    }

    /// Conversations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConversationKey, &[Message])> {
        self.conversations
            .iter()
            .map(|(key, messages)| (key, messages.as_slice()))
    }

    /// Whether no conversation has been created yet.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

impl Serialize for MessageTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conversations.len()))?;
        for (key, messages) in &self.conversations {
            map.serialize_entry(key, messages)?;
        }
        map.end()
    }
}

struct MessageTableVisitor;

impl<'de> Visitor<'de> for MessageTableVisitor {
    type Value = MessageTable;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of conversation keys to message arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = MessageTable::new();
        while let Some((key, messages)) = access.next_entry::<ConversationKey, Vec<Message>>()? {
            table.insert(key, messages);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for MessageTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MessageTableVisitor)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
