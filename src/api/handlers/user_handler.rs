//! Account administration. Accounts are created by an admin, never self-registered.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{RequestContext, ValidatedJson};
use crate::api::AppState;
use crate::domain::{Role, UserResponse};
use crate::errors::AppResult;
use crate::services::NewAccount;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "mgr2@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Display name is required"))]
    #[schema(example = "Manager Han")]
    pub name: String,
    #[validate(length(min = 8, message = "Initial password must be at least 8 characters"))]
    #[schema(example = "handover-2024", min_length = 8)]
    pub password: String,
    pub role: Role,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
}

/// Every account, in id order.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Accounts", body = Vec<UserResponse>),
        (status = 401, description = "No session"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    context: RequestContext,
) -> AppResult<Json<Vec<UserResponse>>> {
    context.require_admin()?;
    let accounts = state.user_service.list_users().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Register a stakeholder account with its role.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    security(("session_cookie" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Form field rejected"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    context: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    context.require_admin()?;

    let account = state
        .user_service
        .create_user(NewAccount {
            email: payload.email,
            name: payload.name,
            password: payload.password,
            role: payload.role,
        })
        .await?;
    tracing::info!(user_id = account.id, role = %account.role, created_by = context.user.id, "account created");

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// One account. Non-admins may only read their own.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 401, description = "No session"),
        (status = 403, description = "Another user's account"),
        (status = 404, description = "No such account")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
) -> AppResult<Json<UserResponse>> {
    if context.user.id != id {
        context.require_admin()?;
    }

    let account = state.user_service.get_user(id).await?;
    Ok(Json(account.into()))
}
