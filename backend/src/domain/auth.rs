//! Authentication primitives: login credentials, registration input, and the
//! stored password check value.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a caller talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{Email, UserValidationError, Username};

/// Shortest password accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN_LEN`] characters.
    PasswordTooShort,
    /// A registration field failed user validation.
    InvalidUser(UserValidationError),
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort => write!(
                f,
                "password must be at least {PASSWORD_MIN_LEN} characters long"
            ),
            Self::InvalidUser(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for LoginValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUser(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for LoginValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::InvalidUser(value)
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. It is not
///   otherwise validated: login compares it exactly against stored records.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use chat_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice@x.com ", "secret1").unwrap();
/// assert_eq!(creds.email(), "alice@x.com");
/// assert_eq!(creds.password(), "secret1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// Password length is counted in characters, not bytes.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let username = Username::new(username)?;
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(LoginValidationError::PasswordTooShort);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Stored credential check value.
///
/// A 32-bit rolling checksum (`h = 31 * h + unit`, wrapping) over the UTF-16
/// code units of the password, rendered as a signed decimal string. It is not
/// a password hash in any security sense; the format is fixed because stored
/// records already carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordCheck(String);

impl PasswordCheck {
    /// Derive the check value for a plaintext password.
    ///
    /// # Examples
    /// ```
    /// use chat_backend::domain::PasswordCheck;
    ///
    /// assert_eq!(PasswordCheck::derive("").as_str(), "0");
    /// assert_eq!(PasswordCheck::derive("a").as_str(), "97");
    /// ```
    pub fn derive(password: &str) -> Self {
        let hash = password.encode_utf16().fold(0_i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        });
        Self(hash.to_string())
    }

    /// Wrap a value read back from storage without re-deriving it.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether `password` derives to this check value.
    pub fn matches(&self, password: &str) -> bool {
        Self::derive(password) == *self
    }

    /// Borrow the decimal representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PasswordCheck> for String {
    fn from(value: PasswordCheck) -> Self {
        value.0
    }
}
