//! Integration tests for API endpoints.
//!
//! The router runs over a migrated in-memory sqlite database and the memory
//! session store; requests go through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use offboarding_tracker::api::{create_router, AppState};
use offboarding_tracker::config::{Config, MAX_DOCUMENT_BYTES};
use offboarding_tracker::infra::{DocumentStore, MemorySessionStore};

use common::InMemoryDrive;

const BOUNDARY: &str = "offboarding-test-boundary";

async fn app() -> Router {
    app_with_documents(None).await
}

async fn app_with_documents(documents: Option<Arc<dyn DocumentStore>>) -> Router {
    let db = Arc::new(common::seeded_db().await);
    let sessions = Arc::new(MemorySessionStore::new(3600));
    let config = Config::from_lookup(|_| None);

    create_router(AppState::from_config(db, sessions, config, None, documents))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, body)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A form part: field name, optional filename and bytes.
type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

fn multipart_request(uri: &str, cookie: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, cookie, _) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": email, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("session cookie")
}

#[tokio::test]
async fn test_login_with_bad_credentials_shows_inline_message() {
    let app = app().await;

    let (status, cookie, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
    assert_eq!(body["error"]["message"], "Email is not registered");

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": "hr@example.com", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Incorrect password");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = app().await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": "hr@example.com", "password": ""}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Password is required"));
}

#[tokio::test]
async fn test_login_then_me_then_logout() {
    let app = app().await;
    let cookie = login(&app, " HR@Example.com ", "hr123").await;
    assert!(cookie.starts_with("offboarding_sid="));

    let (status, _, body) = send(&app, get("/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "hr@example.com");
    assert_eq!(body["role"], "hr");
    assert_eq!(body["chat_linked"], false);

    let logout = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(logout).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let (status, _, _) = send(&app, get("/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_need_a_session() {
    let app = app().await;

    let (status, _, body) = send(&app, get("/cases", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _, _) = send(&app, get("/auth/me", Some("offboarding_sid=forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hr_cannot_create_cases() {
    let app = app().await;
    let cookie = login(&app, "hr@example.com", "hr123").await;

    let (status, _, _) = send(
        &app,
        json_request("POST", "/cases", Some(&cookie), json!({"leaver_name": "Choi"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_manager_opens_case_and_hr_reviews_it() {
    let app = app().await;
    let manager = login(&app, "mgr@example.com", "mgr123").await;
    let hr = login(&app, "hr@example.com", "hr123").await;

    let (status, _, case) = send(
        &app,
        json_request(
            "POST",
            "/cases",
            Some(&manager),
            json!({
                "leaver_name": "Choi",
                "leaver_department": "Sales",
                "desired_leave_date": "2024-06-30",
                "plan_option": "internal_fill",
                "hr_owner_id": 3
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(case["status"], "created");
    assert_eq!(case["manager_id"], 2);
    let id = case["id"].as_i64().unwrap();

    let (status, _, case) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/cases/{}/hr", id),
            Some(&hr),
            json!({"hr_remaining_leave": 3.5, "hr_approved": true, "status": "hr_finance_review"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "hr_finance_review");
    assert_eq!(case["hr_approved"], true);

    // Screens are role-gated
    let (status, _, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/cases/{}/finance", id),
            Some(&hr),
            json!({"finance_approved": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, page) = send(&app, get("/cases?status=hr_finance_review", Some(&manager))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["id"], id);

    let (status, _, link) = send(&app, get(&format!("/cases/{}/link", id), Some(&hr))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["link"], format!("http://localhost:8501/?case_id={}", id));
}

#[tokio::test]
async fn test_case_owner_must_hold_the_role() {
    let app = app().await;
    let manager = login(&app, "mgr@example.com", "mgr123").await;

    // id 4 is the finance account
    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/cases",
            Some(&manager),
            json!({"leaver_name": "Choi", "hr_owner_id": 4}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "HR owner must have the hr role");
}

#[tokio::test]
async fn test_deep_link_redirects_to_case() {
    let app = app().await;

    let response = app.clone().oneshot(get("/?case_id=7", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/cases/7");

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_users_endpoint_is_admin_only() {
    let app = app().await;
    let admin = login(&app, "admin@example.com", "admin123").await;
    let leaver = login(&app, "leaver@example.com", "leaver123").await;

    let (status, _, users) = send(&app, get("/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 5);
    assert!(users[0].get("password_hash").is_none());

    let (status, _, _) = send(&app, get("/users", Some(&leaver))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, created) = send(
        &app,
        json_request(
            "POST",
            "/users",
            Some(&admin),
            json!({"email": "Mgr2@Example.com", "name": "Manager Han", "password": "longenough", "role": "manager"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "mgr2@example.com");
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = app().await;

    let (status, _, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"]["up"], true);
}

/// Opens a case as the manager and returns its id.
async fn open_case(app: &Router) -> i64 {
    let manager = login(app, "mgr@example.com", "mgr123").await;
    let (status, _, case) = send(
        app,
        json_request("POST", "/cases", Some(&manager), json!({"leaver_name": "Choi"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    case["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_leaver_uploads_resignation_letter() {
    let drive = Arc::new(InMemoryDrive::default());
    let app = app_with_documents(Some(drive.clone())).await;
    let id = open_case(&app).await;
    let leaver = login(&app, "leaver@example.com", "leaver123").await;

    let (status, _, body) = send(
        &app,
        multipart_request(
            &format!("/cases/{}/documents", id),
            &leaver,
            &[
                ("kind", None, "resignation".as_bytes()),
                ("file", Some("letter.pdf"), "%PDF-1.4 letter".as_bytes()),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["case"]["resignation_doc_url"], "https://drive.example/file1");
    assert_eq!(body["case"]["handover_doc_url"], Value::Null);
    assert_eq!(body["file"]["name"], format!("case{}_resignation_letter.pdf", id));

    let uploads = drive.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].mime_type, "application/pdf");
    assert_eq!(uploads[0].size, "%PDF-1.4 letter".len());

    let (_, _, case) = send(&app, get(&format!("/cases/{}", id), Some(&leaver))).await;
    assert_eq!(case["resignation_doc_url"], "https://drive.example/file1");
}

#[tokio::test]
async fn test_upload_form_must_name_kind_and_carry_file() {
    let drive = Arc::new(InMemoryDrive::default());
    let app = app_with_documents(Some(drive.clone())).await;
    let id = open_case(&app).await;
    let leaver = login(&app, "leaver@example.com", "leaver123").await;
    let uri = format!("/cases/{}/documents", id);

    let pdf = "pdf".as_bytes();
    let forms = vec![
        (
            vec![("file", Some("letter.pdf"), pdf)],
            "Document kind is required",
        ),
        (vec![("kind", None, "handover".as_bytes())], "File is required"),
        (
            vec![
                ("kind", None, "contract".as_bytes()),
                ("file", Some("letter.pdf"), pdf),
            ],
            "Unknown document kind: contract",
        ),
    ];

    for (parts, message) in forms {
        let (status, _, body) = send(&app, multipart_request(&uri, &leaver, &parts)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", message);
        assert_eq!(body["error"]["message"], message);
    }
    assert!(drive.uploads().is_empty());
}

#[tokio::test]
async fn test_upload_over_the_size_limit_is_413() {
    let drive = Arc::new(InMemoryDrive::default());
    let app = app_with_documents(Some(drive.clone())).await;
    let id = open_case(&app).await;
    let leaver = login(&app, "leaver@example.com", "leaver123").await;

    let oversized = vec![b'x'; MAX_DOCUMENT_BYTES + 128 * 1024];
    let (status, _, body) = send(
        &app,
        multipart_request(
            &format!("/cases/{}/documents", id),
            &leaver,
            &[
                ("kind", None, "handover".as_bytes()),
                ("file", Some("big.pdf"), oversized.as_slice()),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"]["message"], "File exceeds 25 MiB");
    assert!(drive.uploads().is_empty());
}
