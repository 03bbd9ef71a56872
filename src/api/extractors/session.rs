//! Session extractors.
//!
//! `SessionCookie` loads (or starts) the session named by the cookie.
//! `RequestContext` is the authenticated view placed on the request by
//! `auth_middleware`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{Session, SessionUser};
use crate::errors::{AppError, AppResult};

/// The session behind the request cookie, or a fresh one.
pub struct SessionCookie {
    pub session: Session,
    pub jar: CookieJar,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let loaded = match jar.get(SESSION_COOKIE_NAME) {
            Some(cookie) => state.sessions.load(cookie.value()).await?,
            None => None,
        };

        Ok(Self {
            session: loaded.unwrap_or_default(),
            jar,
        })
    }
}

impl SessionCookie {
    /// Persist the session and point the cookie at it.
    pub async fn save(self, state: &AppState) -> AppResult<(CookieJar, Session)> {
        state.sessions.save(&self.session).await?;
        let jar = self.jar.add(session_cookie(self.session.id(), state.cookie_secure));
        Ok((jar, self.session))
    }
}

/// Build the session cookie.
pub fn session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// The caller's session and identity, inserted by the auth middleware.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Session,
    pub user: SessionUser,
}

impl RequestContext {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.user.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
