//! User repository: accounts, lookups and chat linking.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::unique_violation;
use crate::domain::{NewUser, User};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account storage, including the chat-id link used by the bot.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by normalized email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the user currently linked to a chat
    async fn find_by_chat_id(&self, chat_id: &str) -> AppResult<Option<User>>;

    /// Create a new user; duplicate email is a conflict
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// List all users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Link a chat to the user with this email, unlinking any previous holder.
    ///
    /// Returns `None` (and changes nothing) when the email is unknown.
    async fn link_chat(&self, email: &str, chat_id: &str) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_chat_id(&self, chat_id: &str) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(user::Column::TelegramChatId.eq(chat_id))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            email: Set(new_user.email),
            name: Set(new_user.name),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.as_str().to_string()),
            telegram_chat_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, "User"))?;
        User::try_from(model)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn link_chat(&self, email: &str, chat_id: &str) -> AppResult<Option<User>> {
        let txn = self.db.begin().await?;

        let Some(target) = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Ok(None);
        };

        let now = Utc::now();

        // A chat id belongs to at most one user
        let released = UserEntity::update_many()
            .col_expr(user::Column::TelegramChatId, Expr::value(None::<String>))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::TelegramChatId.eq(chat_id))
            .filter(user::Column::Id.ne(target.id))
            .exec(&txn)
            .await?;

        let mut active: ActiveModel = target.into();
        active.telegram_chat_id = Set(Some(chat_id.to_string()));
        active.updated_at = Set(now);
        let model = active.update(&txn).await?;

        txn.commit().await?;

        if released.rows_affected > 0 {
            tracing::info!(chat_id, user_id = model.id, "chat moved to a different user");
        }

        User::try_from(model).map(Some)
    }
}
