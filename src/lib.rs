//! Offboarding Tracker: a leaver's case moves through manager, HR, finance
//! and leaver screens, with documents stored in Google Drive and status
//! changes pushed to Telegram.
//!
//! `api` and `bot` are the two front ends. Both go through `services`, which
//! reach storage and the outbound clients in `infra`. Records and the login
//! gate live in `domain`.
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the development accounts, then start the server
//! offboarding seed
//! offboarding serve
//!
//! # Run the chat bot next to the server
//! offboarding bot
//!
//! # Run migrations by hand
//! offboarding migrate status
//! ```

pub mod api;
pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{OffboardingCase, Password, Role, Session, User};
pub use errors::{AppError, AppResult};
