//! Bot command - Runs the Telegram command bot.

use std::sync::Arc;

use crate::bot::{run_polling, CommandHandler};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, TelegramClient, UserStore};

/// Execute the bot command
///
/// The token is checked before anything else; a missing or malformed token
/// stops the process.
pub async fn execute(config: Config) -> AppResult<()> {
    let client = TelegramClient::new(config.telegram_bot_token())?;

    let db = Database::connect(&config).await?;
    let handler = CommandHandler::new(Arc::new(UserStore::new(db.conn())));

    let username = client.get_me().await?;
    match username.as_deref() {
        Some(name) => tracing::info!(bot = %name, "Bot started. Press Ctrl+C to stop."),
        None => tracing::warn!("getMe returned no username, accepting any @suffix"),
    }

    tokio::select! {
        _ = run_polling(&client, &handler, username.as_deref()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping bot...");
        }
    }

    tracing::info!("Bot stopped.");
    Ok(())
}
