//! Driving port for user lookups and contact search.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading accounts.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Contacts whose username contains `query` ignoring case, or whose id or
    /// server tag contains the lower-cased `query`. `exclude` is never
    /// returned. Results follow registration order.
    async fn find_by_query(&self, query: &str, exclude: &UserId) -> Result<Vec<User>, Error>;

    /// Fetch one account.
    async fn find_by_id(&self, id: &UserId) -> Result<User, Error>;
}
