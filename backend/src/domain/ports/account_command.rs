//! Driving port for account mutations: registration and profile updates.

use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

/// Domain use-case port for creating and editing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account.
    ///
    /// Fails with a conflict when the email is taken or the username is taken
    /// ignoring case; a conflict leaves the table untouched.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Replace the stored record that has `user.id()`.
    ///
    /// Last writer wins: no version check is made, and the new username is
    /// not re-checked for uniqueness.
    async fn update(&self, user: &User) -> Result<(), Error>;
}
