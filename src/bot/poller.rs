//! Long-polling loop.

use tokio::time::{sleep, Duration};

use super::handler::CommandHandler;
use crate::config::{TELEGRAM_POLL_ERROR_PAUSE_SECONDS, TELEGRAM_POLL_TIMEOUT_SECONDS};
use crate::infra::telegram::Update;
use crate::infra::{ChatNotifier, TelegramClient};

/// Poll for updates until the task is dropped.
///
/// A failed `getUpdates` is logged and retried after a fixed pause.
///
/// Without a known username, `/cmd@Name` is answered whatever `Name` is.
pub async fn run_polling(
    client: &TelegramClient,
    handler: &CommandHandler,
    bot_username: Option<&str>,
) {
    let mut offset: Option<i64> = None;

    loop {
        let updates = match client
            .get_updates(offset, TELEGRAM_POLL_TIMEOUT_SECONDS)
            .await
        {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "polling failed, pausing");
                sleep(Duration::from_secs(TELEGRAM_POLL_ERROR_PAUSE_SECONDS)).await;
                continue;
            }
        };

        if let Some(next) = handle_updates(client, handler, bot_username, updates).await {
            offset = Some(next);
        }
    }
}

/// Answer a batch of updates. Returns the offset that acknowledges them.
pub async fn handle_updates(
    notifier: &dyn ChatNotifier,
    handler: &CommandHandler,
    bot_username: Option<&str>,
    updates: Vec<Update>,
) -> Option<i64> {
    let mut next_offset = None;

    for update in updates {
        next_offset = Some(update.update_id + 1);

        let Some(message) = update.message else {
            continue;
        };
        let Some(text) = message.text.as_deref() else {
            continue;
        };
        let chat_id = message.chat.id;

        match handler.reply(chat_id, text, bot_username).await {
            Ok(Some(reply)) => {
                if let Err(e) = notifier.send_message(chat_id.to_string(), reply).await {
                    tracing::warn!(chat_id, error = %e, "reply failed");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!(chat_id, error = %e, "command failed"),
        }
    }

    next_offset
}
