//! Argument parsing for the `offboarding` binary.
//!
//! `serve` runs the web app and `bot` runs the Telegram poller; both share
//! the database that `migrate` and `seed` prepare. `drive-auth` writes the
//! OAuth token file used for document uploads.

pub mod args;

pub use args::{Cli, Commands};
