//! Everything that talks to the outside: the SQL database, the session
//! store (Redis or in-process), Google Drive and the Telegram Bot API.

pub mod db;
pub mod drive;
pub mod repositories;
pub mod session_store;
pub mod telegram;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use drive::{DocumentStore, DriveClient, DriveCredentials, DriveFile, NO_CREDENTIALS};
pub use repositories::{CaseRepository, CaseStore, UserRepository, UserStore};
pub use session_store::{connect_session_store, MemorySessionStore, RedisSessionStore, SessionStore};
pub use telegram::{validate_bot_token, ChatNotifier, TelegramClient};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use drive::MockDocumentStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockCaseRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use telegram::MockChatNotifier;
