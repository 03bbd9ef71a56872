//! Login, logout and "who am I" over the session cookie.

use axum::{
    extract::State,
    middleware,
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{RequestContext, SessionCookie, ValidatedJson};
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::domain::{do_logout, set_logged_in, UserResponse};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Matched case-insensitively
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "hr@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "hr123")]
    pub password: String,
}

pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/login", post(login))
}

/// Log in and start an authenticated session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = UserResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Email is not registered / Incorrect password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    cookie: SessionCookie,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let user = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    let SessionCookie { mut session, jar } = cookie;

    // New identity, new session id
    let previous_id = session.rotate_id();
    state.sessions.delete(&previous_id).await?;
    set_logged_in(&mut session, &user);

    let (jar, _) = SessionCookie { session, jar }.save(&state).await?;
    tracing::info!(user_id = user.id, role = %user.role, "user logged in");

    Ok((jar, Json(UserResponse::from(user))))
}

/// Log out and go back to the login page
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Session",
    security(("session_cookie" = [])),
    responses(
        (status = 303, description = "Logged out, redirect to /"),
        (status = 401, description = "No session")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    context: RequestContext,
    mut cookie: SessionCookie,
) -> AppResult<(CookieJar, Redirect)> {
    do_logout(&mut cookie.session);
    let (jar, _) = cookie.save(&state).await?;
    tracing::info!(user_id = context.user.id, "user logged out");

    Ok((jar, Redirect::to("/")))
}

/// Get the logged-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Session",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Signed-in account", body = UserResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    context: RequestContext,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .auth_service
        .current_user(&context.session)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}
