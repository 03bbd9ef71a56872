//! Telegram command bot.
//!
//! Users link their chat to an account with `/start <email>`; after that the
//! case service can reach them with status notifications.

mod command;
mod handler;
mod poller;

pub use command::BotCommand;
pub use handler::{CommandHandler, NOT_LINKED_REPLY, START_USAGE_REPLY};
pub use poller::{handle_updates, run_polling};
