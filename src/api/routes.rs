//! Top-level router: public pages, the session-gated API and docs.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, case_routes, user_routes};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let docs = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(docs)
        // login is public; logout and /me are gated inside auth_routes
        .nest("/auth", auth_routes(state.clone()))
        .nest("/cases", gated(case_routes(), &state))
        .nest("/users", gated(user_routes(), &state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every route in `routes` requires a logged-in session.
fn gated(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

#[derive(Debug, Deserialize)]
struct RootQuery {
    case_id: Option<i32>,
}

/// `/?case_id=N` is the link shared in chat; it opens that case.
async fn root(Query(query): Query<RootQuery>) -> Response {
    match query.case_id {
        Some(id) => Redirect::to(&format!("/cases/{}", id)).into_response(),
        None => "Offboarding Tracker".into_response(),
    }
}

#[derive(Serialize)]
struct HealthReport {
    ok: bool,
    database: DependencyStatus,
}

#[derive(Serialize)]
struct DependencyStatus {
    up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = match state.database.ping().await {
        Ok(()) => DependencyStatus { up: true, detail: None },
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            DependencyStatus { up: false, detail: Some(e.to_string()) }
        }
    };

    let code = if database.up { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(HealthReport { ok: database.up, database }))
}
