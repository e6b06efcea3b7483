//! Identity store service.
//!
//! Implements the account driving ports (`AccountCommand`, `LoginService`,
//! `UsersQuery`) over a whole-table [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    AccountCommand, LoginService, UserRepository, UserRepositoryError, UsersQuery,
};
use crate::domain::user::UserDraft;
use crate::domain::{
    Avatar, Error, LoginCredentials, PasswordCheck, Registration, ServerTag, User, UserId,
};

pub(super) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Storage { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Encoding { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Account service backed by a users table.
///
/// Read-modify-write cycles on the table are serialised by a write gate
/// shared between clones, so two registrations in the same process cannot
/// both pass the uniqueness check. Writers in other processes are not
/// coordinated with.
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    write_gate: Arc<Mutex<()>>,
}

impl<R> AccountService<R> {
    /// Create a new service over the users table.
    pub fn new(users: Arc<R>) -> Self {
        Self {
            users,
            write_gate: Arc::new(Mutex::new(())),
        }
    }
}

impl<R> AccountService<R>
where
    R: UserRepository,
{
    async fn load(&self) -> Result<Vec<User>, Error> {
        self.users.load_all().await.map_err(map_user_repository_error)
    }

    async fn save(&self, users: &[User]) -> Result<(), Error> {
        self.users
            .save_all(users)
            .await
            .map_err(map_user_repository_error)
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let _gate = self.write_gate.lock().await;
        let mut users = self.load().await?;

        if users.iter().any(|user| user.email() == registration.email()) {
            debug!(email = %registration.email(), "registration rejected: email taken");
            return Err(Error::conflict("email is already registered"));
        }
        if users
            .iter()
            .any(|user| user.username().eq_ignore_case(registration.username()))
        {
            debug!(username = %registration.username(), "registration rejected: username taken");
            return Err(Error::conflict("username is already taken"));
        }

        let user = User::new(UserDraft {
            id: UserId::random(),
            server_tag: ServerTag::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_check: PasswordCheck::derive(registration.password()),
            avatar: Avatar::placeholder(registration.username()),
        });
        users.push(user.clone());
        self.save(&users).await?;

        debug!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), Error> {
        let _gate = self.write_gate.lock().await;
        let mut users = self.load().await?;

        let Some(slot) = users.iter_mut().find(|existing| existing.id() == user.id()) else {
            return Err(Error::not_found(format!("user {} not found", user.id())));
        };
        *slot = user.clone();
        self.save(&users).await?;

        debug!(user_id = %user.id(), "updated user");
        Ok(())
    }
}

#[async_trait]
impl<R> LoginService for AccountService<R>
where
    R: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let users = self.load().await?;
        let found = users.into_iter().find(|user| {
            user.email().as_ref() == credentials.email()
                && user.password_check().matches(credentials.password())
        });
        match found {
            Some(user) => {
                debug!(user_id = %user.id(), "login succeeded");
                Ok(user)
            }
            None => {
                debug!("login rejected");
                Err(Error::invalid_credentials())
            }
        }
    }
}

#[async_trait]
impl<R> UsersQuery for AccountService<R>
where
    R: UserRepository,
{
    async fn find_by_query(&self, query: &str, exclude: &UserId) -> Result<Vec<User>, Error> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let users = self.load().await?;
        Ok(users
            .into_iter()
            .filter(|user| user.id() != exclude)
            .filter(|user| {
                user.username().contains_ignore_case(&needle)
                    || user.id().as_str().contains(needle.as_str())
                    || user.server_tag().as_ref().contains(needle.as_str())
            })
            .collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, Error> {
        self.load()
            .await?
            .into_iter()
            .find(|user| user.id() == id)
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
