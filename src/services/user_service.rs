//! Stakeholder accounts: lookup, listing and admin-driven registration.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{normalize_email, NewUser, Password, Role, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Plain-text form of an account an admin wants to register.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: i32) -> AppResult<User>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Normalizes the email, hashes the password under the length policy
    /// and rejects an email that is already registered.
    async fn create_user(&self, account: NewAccount) -> AppResult<User>;
}

pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn create_user(&self, account: NewAccount) -> AppResult<User> {
        let email = normalize_email(&account.email);
        let name = account.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(format!("Account {}", email)));
        }

        let password_hash = Password::new(&account.password)?.into_string();
        let record = NewUser {
            email,
            name,
            password_hash,
            role: account.role,
        };

        self.uow.users().create(record).await
    }
}
