//! User data model.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::PasswordCheck;
use super::message::CONVERSATION_SEPARATOR;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The user id was empty.
    EmptyId,
    /// The user id had surrounding whitespace.
    InvalidId,
    /// The user id contained the conversation separator.
    IdContainsSeparator,
    EmptyServerTag,
    /// The server tag contained something other than digits.
    InvalidServerTag,
    EmptyUsername,
    EmptyEmail,
    /// The email did not look like `name@domain`.
    InvalidEmail,
    EmptyAvatar,
    /// The profile picture was not an image data URL.
    AvatarNotImage,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::IdContainsSeparator => write!(
                f,
                "user id must not contain the conversation separator {CONVERSATION_SEPARATOR}"
            ),
            Self::EmptyServerTag => write!(f, "server tag must not be empty"),
            Self::InvalidServerTag => write!(f, "server tag may only contain digits"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
            Self::EmptyAvatar => write!(f, "profile picture must not be empty"),
            Self::AvatarNotImage => write!(f, "profile picture must be an image data URL"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable, opaque user identifier.
///
/// New identifiers are random UUIDs; stored identifiers are accepted as-is
/// provided they are non-empty, trimmed, and free of the conversation key
/// separator (otherwise a conversation key could not be split back into its
/// two participants).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        if id.contains(CONVERSATION_SEPARATOR) {
            return Err(UserValidationError::IdContainsSeparator);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Display grouping tag shown next to a user ("server").
///
/// This is not a shard key; it only helps people find each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerTag(String);

/// Smallest generated server tag.
pub const SERVER_TAG_MIN: u16 = 1000;
/// Largest generated server tag.
pub const SERVER_TAG_MAX: u16 = 9999;

impl ServerTag {
    /// Validate and construct a [`ServerTag`].
    pub fn new(tag: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(tag.into())
    }

    /// Draw a random four digit tag.
    pub fn random() -> Self {
        let value = rand::thread_rng().gen_range(SERVER_TAG_MIN..=SERVER_TAG_MAX);
        Self(value.to_string())
    }

    fn from_owned(tag: String) -> Result<Self, UserValidationError> {
        if tag.is_empty() {
            return Err(UserValidationError::EmptyServerTag);
        }
        if !tag.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidServerTag);
        }
        Ok(Self(tag))
    }
}

impl AsRef<str> for ServerTag {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ServerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ServerTag> for String {
    fn from(value: ServerTag) -> Self {
        value.0
    }
}

impl TryFrom<String> for ServerTag {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Name other users search for and see in their chat list.
///
/// Stored trimmed. Uniqueness is case-insensitive and only checked at
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`], trimming surrounding whitespace.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive comparison used by the registration uniqueness rule.
    pub fn eq_ignore_case(&self, other: &Username) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }

    /// Case-insensitive substring test used by contact search.
    pub fn contains_ignore_case(&self, needle_lowercase: &str) -> bool {
        self.0.to_lowercase().contains(needle_lowercase)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Login email address. Compared exactly, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`], trimming surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use chat_backend::domain::Email;
    ///
    /// let email = Email::new(" alice@x.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "alice@x.com");
    /// assert!(Email::new("alice").is_err());
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        match trimmed.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile picture reference: a URL or an inline image data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Avatar(String);

const IMAGE_DATA_URL_PREFIX: &str = "data:image/";

impl Avatar {
    /// Accept any non-empty reference, as found in stored records.
    pub fn new(reference: impl Into<String>) -> Result<Self, UserValidationError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(UserValidationError::EmptyAvatar);
        }
        Ok(Self(reference))
    }

    /// Accept an uploaded picture, which must be an image data URL.
    pub fn from_image_data_url(data_url: impl Into<String>) -> Result<Self, UserValidationError> {
        let data_url = data_url.into();
        if data_url.trim().is_empty() {
            return Err(UserValidationError::EmptyAvatar);
        }
        if !data_url.starts_with(IMAGE_DATA_URL_PREFIX) {
            return Err(UserValidationError::AvatarNotImage);
        }
        Ok(Self(data_url))
    }

    /// Generated placeholder picture seeded by the username.
    pub fn placeholder(username: &Username) -> Self {
        Self(format!("https://picsum.photos/seed/{username}/200"))
    }
}

impl AsRef<str> for Avatar {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Avatar> for String {
    fn from(value: Avatar) -> Self {
        value.0
    }
}

impl TryFrom<String> for Avatar {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated components used to assemble a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Stable identifier.
    pub id: UserId,
    /// Display grouping tag.
    pub server_tag: ServerTag,
    /// Public username.
    pub username: Username,
    /// Login email.
    pub email: Email,
    /// Derived password check value.
    pub password_check: PasswordCheck,
    /// Profile picture reference.
    pub avatar: Avatar,
}

/// Registered account.
///
/// ## Invariants
/// - every component is individually validated (see the value types).
/// - `id` never changes after registration; profile edits replace
///   `username` and `avatar` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    server_tag: ServerTag,
    username: Username,
    email: Email,
    password_check: PasswordCheck,
    avatar: Avatar,
}

/// Number of trailing id characters shown in a user's handle.
const HANDLE_ID_SUFFIX_LEN: usize = 6;

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            server_tag,
            username,
            email,
            password_check,
            avatar,
        } = draft;
        Self {
            id,
            server_tag,
            username,
            email,
            password_check,
            avatar,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display grouping tag.
    pub fn server_tag(&self) -> &ServerTag {
        &self.server_tag
    }

    /// Public username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Derived password check value.
    pub fn password_check(&self) -> &PasswordCheck {
        &self.password_check
    }

    /// Profile picture reference.
    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    /// Shareable handle: the server tag plus the tail of the id.
    ///
    /// # Examples
    /// ```
    /// use chat_backend::domain::user::{User, UserDraft};
    /// use chat_backend::domain::{Avatar, Email, PasswordCheck, ServerTag, UserId, Username};
    ///
    /// let username = Username::new("alice").unwrap();
    /// let user = User::new(UserDraft {
    ///     id: UserId::new("user-0001-abcdef").unwrap(),
    ///     server_tag: ServerTag::new("4242").unwrap(),
    ///     avatar: Avatar::placeholder(&username),
    ///     username,
    ///     email: Email::new("alice@x.com").unwrap(),
    ///     password_check: PasswordCheck::derive("secret1"),
    /// });
    /// assert_eq!(user.handle(), "4242-abcdef");
    /// ```
    pub fn handle(&self) -> String {
        let id = self.id.as_str();
        let start = id
            .char_indices()
            .rev()
            .nth(HANDLE_ID_SUFFIX_LEN - 1)
            .map_or(0, |(index, _)| index);
        format!("{}-{}", self.server_tag, &id[start..])
    }

    /// Copy of this user with a new username.
    #[must_use]
    pub fn with_username(mut self, username: Username) -> Self {
        self.username = username;
        self
    }

    /// Copy of this user with a new profile picture.
    #[must_use]
    pub fn with_avatar(mut self, avatar: Avatar) -> Self {
        self.avatar = avatar;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    server_id: String,
    username: String,
    email: String,
    password_hash: String,
    profile_picture: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            server_tag,
            username,
            email,
            password_check,
            avatar,
        } = value;
        Self {
            id: id.into(),
            server_id: server_tag.into(),
            username: username.into(),
            email: email.into(),
            password_hash: password_check.into(),
            profile_picture: avatar.into(),
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        Ok(User::new(UserDraft {
            id: UserId::try_from(value.id)?,
            server_tag: ServerTag::try_from(value.server_id)?,
            username: Username::try_from(value.username)?,
            email: Email::try_from(value.email)?,
            password_check: PasswordCheck::from_stored(value.password_hash),
            avatar: Avatar::try_from(value.profile_picture)?,
        }))
    }
}
