//! One module per `offboarding` subcommand.

pub mod bot;
pub mod drive_auth;
pub mod migrate;
pub mod seed;
pub mod serve;
