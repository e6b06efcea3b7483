//! The acting identity passed to operations that need one.

use serde::{Deserialize, Serialize};

use super::user::{User, UserId};

/// A logged-in user.
///
/// Sessions are handed explicitly to every operation that acts on behalf of
/// someone; nothing looks the current user up ambiently. Persisted as the
/// bare user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    user: User,
}

impl Session {
    /// Start a session acting as `user`.
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// The acting user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Shorthand for `self.user().id()`.
    pub fn user_id(&self) -> &UserId {
        self.user.id()
    }
}
