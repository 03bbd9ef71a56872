//! HTTP front end: login, the case role screens and account admin.
//!
//! Every route except login, `/`, `/health` and the docs sits behind the
//! session cookie gate in `middleware`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
