//! Session lifecycle: restore, register, login, logout, and profile edits.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ports::{AccountCommand, LoginService, SessionStore, SessionStoreError};
use crate::domain::{
    Avatar, Error, LoginCredentials, Registration, Session, Username,
};

fn map_session_store_error(error: SessionStoreError) -> Error {
    match error {
        SessionStoreError::Storage { message } => {
            Error::service_unavailable(format!("session store unavailable: {message}"))
        }
        SessionStoreError::Encoding { message } => {
            Error::internal(format!("session store error: {message}"))
        }
    }
}

/// Creates and persists sessions.
///
/// The manager does not hold a "current" session; callers keep the
/// [`Session`] they are given and pass it back in.
#[derive(Clone)]
pub struct SessionManager {
    accounts: Arc<dyn AccountCommand>,
    login: Arc<dyn LoginService>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionManager {
    /// Build a manager over the account, login and session ports.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        login: Arc<dyn LoginService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            accounts,
            login,
            sessions,
        }
    }

    /// Read the stored session, if any. Intended to run once at start-up.
    ///
    /// A corrupt stored session is discarded by the store and yields `None`.
    pub async fn restore(&self) -> Result<Option<Session>, Error> {
        let restored = self
            .sessions
            .load()
            .await
            .map_err(map_session_store_error)?;
        match &restored {
            Some(session) => debug!(user_id = %session.user_id(), "restored session"),
            None => debug!("no stored session"),
        }
        Ok(restored)
    }

    /// Register an account and start a session for it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let registration = Registration::try_from_parts(username, email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = self.accounts.register(&registration).await?;
        self.persist(Session::new(user)).await
    }

    /// Authenticate and start a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = self.login.login(&credentials).await?;
        self.persist(Session::new(user)).await
    }

    /// End `session` and forget the stored copy.
    pub async fn logout(&self, session: Session) -> Result<(), Error> {
        self.sessions
            .clear()
            .await
            .map_err(map_session_store_error)?;
        info!(user_id = %session.user_id(), "logged out");
        Ok(())
    }

    /// Change the session user's username.
    ///
    /// The name is trimmed. Blank names and names equal to the current one
    /// are ignored and the session is returned unchanged. Uniqueness is not
    /// re-checked.
    pub async fn rename(&self, session: &Session, name: &str) -> Result<Session, Error> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == session.user().username().as_ref() {
            return Ok(session.clone());
        }
        let username =
            Username::new(trimmed).map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = session.user().clone().with_username(username);
        self.accounts.update(&user).await?;
        self.persist(Session::new(user)).await
    }

    /// Replace the session user's profile picture with an uploaded image.
    ///
    /// Only image data URLs are accepted.
    pub async fn change_avatar(&self, session: &Session, data_url: &str) -> Result<Session, Error> {
        let avatar = Avatar::from_image_data_url(data_url)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = session.user().clone().with_avatar(avatar);
        self.accounts.update(&user).await?;
        self.persist(Session::new(user)).await
    }

    async fn persist(&self, session: Session) -> Result<Session, Error> {
        self.sessions
            .save(&session)
            .await
            .map_err(map_session_store_error)?;
        debug!(user_id = %session.user_id(), "persisted session");
        Ok(session)
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
