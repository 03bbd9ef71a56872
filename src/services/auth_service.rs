//! Authentication service - Password login and session identity resolution.
//!
//! Session keys are written by `domain::session`; this service only decides
//! whether credentials are good and maps a session back to a user record.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{normalize_email, session::session_user_id, verify_password, Session, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{UnitOfWork, UserRepository};

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and return the matching user.
    ///
    /// Unknown email and wrong password are reported separately so the login
    /// form can show which field is wrong.
    async fn login(&self, email: String, password: String) -> AppResult<User>;

    /// Resolve the logged-in user of a session.
    async fn current_user(&self, session: &Session) -> AppResult<Option<User>>;
}

/// Resolve the session's user id to a full record.
///
/// `None` when the session holds no user id or the user no longer exists.
pub async fn current_user(session: &Session, users: &dyn UserRepository) -> AppResult<Option<User>> {
    match session_user_id(session) {
        Some(id) => users.find_by_id(id).await,
        None => Ok(None),
    }
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, email: String, password: String) -> AppResult<User> {
        let email = normalize_email(&email);

        let user = self
            .uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UnknownEmail)?;

        if !verify_password(&password, &user.password_hash) {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Err(AppError::WrongPassword);
        }

        tracing::info!(user_id = user.id, role = %user.role, "user logged in");
        Ok(user)
    }

    async fn current_user(&self, session: &Session) -> AppResult<Option<User>> {
        current_user(session, self.uow.users().as_ref()).await
    }
}
