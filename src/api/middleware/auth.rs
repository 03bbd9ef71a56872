//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::extractors::RequestContext;
use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::session_user;
use crate::errors::AppError;

/// Session authentication middleware.
///
/// Loads the session named by the cookie, requires it to be logged in, then
/// injects the `RequestContext` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let session_id = jar
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let session = state
        .sessions
        .load(&session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = session_user(&session).ok_or(AppError::Unauthorized)?;

    request
        .extensions_mut()
        .insert(RequestContext { session, user });

    Ok(next.run(request).await)
}
