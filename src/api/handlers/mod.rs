//! HTTP request handlers.

pub mod auth_handler;
pub mod case_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use case_handler::case_routes;
pub use user_handler::user_routes;
