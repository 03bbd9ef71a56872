//! Command replies.

use std::sync::Arc;

use super::command::BotCommand;
use crate::domain::normalize_email;
use crate::errors::AppResult;
use crate::infra::UserRepository;

pub const START_USAGE_REPLY: &str =
    "Hello! Link your account by sending:\n\n/start your_email@example.com";

pub const NOT_LINKED_REPLY: &str = "Not linked yet. Use /start your_email@example.com";

/// Answers bot commands from the user table.
pub struct CommandHandler {
    users: Arc<dyn UserRepository>,
}

impl CommandHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Reply to a message, or `None` when the bot should stay quiet.
    pub async fn reply(
        &self,
        chat_id: i64,
        text: &str,
        bot_username: Option<&str>,
    ) -> AppResult<Option<String>> {
        match BotCommand::parse(text, bot_username) {
            Some(command) => self.handle(chat_id, command).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn handle(&self, chat_id: i64, command: BotCommand) -> AppResult<String> {
        match command {
            BotCommand::Start(None) => Ok(START_USAGE_REPLY.to_string()),
            BotCommand::Start(Some(email)) => self.link(chat_id, &email).await,
            BotCommand::WhoAmI => self.whoami(chat_id).await,
            BotCommand::Ping => Ok("pong".to_string()),
        }
    }

    async fn link(&self, chat_id: i64, email: &str) -> AppResult<String> {
        let email = normalize_email(email);

        match self.users.link_chat(&email, &chat_id.to_string()).await? {
            Some(user) => {
                tracing::info!(user_id = user.id, chat_id, "chat linked");
                Ok(format!(
                    "Linked successfully.\nemail={}\nchat_id={}",
                    email, chat_id
                ))
            }
            None => {
                tracing::info!(chat_id, "link attempt for unknown email");
                Ok(format!("Email not found: {}", email))
            }
        }
    }

    async fn whoami(&self, chat_id: i64) -> AppResult<String> {
        let reply = match self.users.find_by_chat_id(&chat_id.to_string()).await? {
            Some(user) => format!(
                "name={}\nemail={}\nrole={}\nchat_id={}",
                user.name, user.email, user.role, chat_id
            ),
            None => NOT_LINKED_REPLY.to_string(),
        };
        Ok(reply)
    }
}
