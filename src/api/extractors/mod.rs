//! Custom extractors for request handling.

mod session;
mod validated_json;

pub use session::{session_cookie, RequestContext, SessionCookie};
pub use validated_json::ValidatedJson;
