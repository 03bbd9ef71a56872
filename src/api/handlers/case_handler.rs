//! Case handlers - the role screens.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{RequestContext, ValidatedJson};
use crate::api::AppState;
use crate::config::MAX_DOCUMENT_BYTES;
use crate::domain::{CaseChanges, CaseFilter, CaseStatus, DocumentKind, NewCase, OffboardingCase, PlanOption};
use crate::errors::{AppError, AppResult};
use crate::infra::DriveFile;
use crate::services::{CaseScreen, DocumentUpload};
use crate::types::{Paginated, PaginationParams};

/// Manager screen: open a case
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCaseRequest {
    #[validate(length(min = 1, message = "Leaver name is required"))]
    #[schema(example = "Choi")]
    pub leaver_name: String,
    #[schema(example = "Engineering")]
    pub leaver_department: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-30")]
    pub desired_leave_date: Option<NaiveDate>,
    pub plan_option: Option<PlanOption>,
    pub hr_owner_id: Option<i32>,
    pub finance_owner_id: Option<i32>,
    pub note: Option<String>,
}

impl From<CreateCaseRequest> for NewCase {
    fn from(req: CreateCaseRequest) -> Self {
        Self {
            leaver_name: req.leaver_name,
            leaver_department: req.leaver_department,
            desired_leave_date: req.desired_leave_date,
            plan_option: req.plan_option,
            manager_id: None,
            hr_owner_id: req.hr_owner_id,
            finance_owner_id: req.finance_owner_id,
            note: req.note,
        }
    }
}

/// A present key, `null` included, as opposed to a missing one.
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Manager screen: edit details, final approval and status.
///
/// For the optional columns a missing key leaves the value alone and `null` clears it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ManagerUpdateRequest {
    #[validate(length(min = 1, message = "Leaver name is required"))]
    pub leaver_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub leaver_department: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Date)]
    pub desired_leave_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<PlanOption>)]
    pub plan_option: Option<Option<PlanOption>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub hr_owner_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub finance_owner_id: Option<Option<i32>>,
    pub manager_final_approved: Option<bool>,
    pub status: Option<CaseStatus>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
}

impl From<ManagerUpdateRequest> for CaseChanges {
    fn from(req: ManagerUpdateRequest) -> Self {
        Self {
            leaver_name: req.leaver_name,
            leaver_department: req.leaver_department,
            desired_leave_date: req.desired_leave_date,
            plan_option: req.plan_option,
            hr_owner_id: req.hr_owner_id,
            finance_owner_id: req.finance_owner_id,
            manager_final_approved: req.manager_final_approved,
            status: req.status,
            note: req.note,
            ..Default::default()
        }
    }
}

/// HR screen: remaining leave and approval
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct HrUpdateRequest {
    /// Remaining annual leave in days
    #[validate(range(min = 0.0, message = "Remaining leave must be zero or more"))]
    #[schema(example = 3.5)]
    pub hr_remaining_leave: Option<f64>,
    pub hr_approved: Option<bool>,
    pub status: Option<CaseStatus>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
}

impl From<HrUpdateRequest> for CaseChanges {
    fn from(req: HrUpdateRequest) -> Self {
        Self {
            hr_remaining_leave: req.hr_remaining_leave,
            hr_approved: req.hr_approved,
            status: req.status,
            note: req.note,
            ..Default::default()
        }
    }
}

/// Finance screen: severance and approval
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct FinanceUpdateRequest {
    #[validate(range(min = 0.0, message = "Severance must be zero or more"))]
    #[schema(example = 1200000.0)]
    pub finance_severance: Option<f64>,
    pub finance_approved: Option<bool>,
    pub status: Option<CaseStatus>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
}

impl From<FinanceUpdateRequest> for CaseChanges {
    fn from(req: FinanceUpdateRequest) -> Self {
        Self {
            finance_severance: req.finance_severance,
            finance_approved: req.finance_approved,
            status: req.status,
            note: req.note,
            ..Default::default()
        }
    }
}

/// Leaver screen: final confirmation and document links
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct LeaverUpdateRequest {
    pub leaver_final_approved: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub resignation_doc_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub handover_doc_url: Option<Option<String>>,
    pub status: Option<CaseStatus>,
}

impl From<LeaverUpdateRequest> for CaseChanges {
    fn from(req: LeaverUpdateRequest) -> Self {
        Self {
            leaver_final_approved: req.leaver_final_approved,
            resignation_doc_url: req.resignation_doc_url,
            handover_doc_url: req.handover_doc_url,
            status: req.status,
            ..Default::default()
        }
    }
}

/// Case list filter and page
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseListQuery {
    /// Only cases in this status
    pub status: Option<CaseStatus>,
    /// 1-based page number
    #[param(minimum = 1, example = 1)]
    pub page: Option<u64>,
    /// Page size, capped at 100
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub per_page: Option<u64>,
}

impl CaseListQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Multipart body of a document upload
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    pub kind: DocumentKind,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Deep link to a case
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseLinkResponse {
    #[schema(example = 7)]
    pub case_id: i32,
    #[schema(example = "http://localhost:8501/?case_id=7")]
    pub link: String,
}

/// Result of a document upload
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub case: OffboardingCase,
    pub file: DriveFile,
}

/// Create case routes
pub fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cases).post(create_case))
        .route("/:id", get(get_case))
        .route("/:id/link", get(case_link))
        .route("/:id/manager", patch(update_as_manager))
        .route("/:id/hr", patch(update_as_hr))
        .route("/:id/finance", patch(update_as_finance))
        .route("/:id/leaver", patch(update_as_leaver))
        .route(
            "/:id/documents",
            post(upload_document).layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 64 * 1024)),
        )
}

/// List cases, newest first
#[utoipa::path(
    get,
    path = "/cases",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(CaseListQuery),
    responses(
        (status = 200, description = "Page of cases", body = [OffboardingCase]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_cases(
    State(state): State<AppState>,
    _context: RequestContext,
    Query(query): Query<CaseListQuery>,
) -> AppResult<Json<Paginated<OffboardingCase>>> {
    let pagination = query.pagination();
    let (page, per_page) = (pagination.page, pagination.limit());
    let filter = CaseFilter {
        status: query.status,
    };

    let (cases, total) = state.case_service.list_cases(filter, pagination).await?;
    Ok(Json(Paginated::new(cases, page, per_page, total)))
}

/// Open a new case (manager or admin)
#[utoipa::path(
    post,
    path = "/cases",
    tag = "Cases",
    security(("session_cookie" = [])),
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = OffboardingCase),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - manager or admin only")
    )
)]
pub async fn create_case(
    State(state): State<AppState>,
    context: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateCaseRequest>,
) -> AppResult<(StatusCode, Json<OffboardingCase>)> {
    let case = state
        .case_service
        .create_case(&context.user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(case)))
}

/// Get a case
#[utoipa::path(
    get,
    path = "/cases/{id}",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case", body = OffboardingCase),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn get_case(
    State(state): State<AppState>,
    _context: RequestContext,
    Path(id): Path<i32>,
) -> AppResult<Json<OffboardingCase>> {
    Ok(Json(state.case_service.get_case(id).await?))
}

/// Deep link that opens the case
#[utoipa::path(
    get,
    path = "/cases/{id}/link",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Deep link", body = CaseLinkResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn case_link(
    State(state): State<AppState>,
    _context: RequestContext,
    Path(id): Path<i32>,
) -> AppResult<Json<CaseLinkResponse>> {
    let case = state.case_service.get_case(id).await?;

    Ok(Json(CaseLinkResponse {
        case_id: case.id,
        link: state.case_service.case_link(case.id),
    }))
}

async fn apply_screen(
    state: &AppState,
    context: &RequestContext,
    id: i32,
    screen: CaseScreen,
    changes: CaseChanges,
) -> AppResult<Json<OffboardingCase>> {
    let case = state
        .case_service
        .update_case(&context.user, id, screen, changes)
        .await?;
    Ok(Json(case))
}

/// Manager screen update
#[utoipa::path(
    patch,
    path = "/cases/{id}/manager",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    request_body = ManagerUpdateRequest,
    responses(
        (status = 200, description = "Updated case", body = OffboardingCase),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - manager or admin only"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn update_as_manager(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ManagerUpdateRequest>,
) -> AppResult<Json<OffboardingCase>> {
    apply_screen(&state, &context, id, CaseScreen::Manager, payload.into()).await
}

/// HR screen update
#[utoipa::path(
    patch,
    path = "/cases/{id}/hr",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    request_body = HrUpdateRequest,
    responses(
        (status = 200, description = "Updated case", body = OffboardingCase),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - HR or admin only"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn update_as_hr(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<HrUpdateRequest>,
) -> AppResult<Json<OffboardingCase>> {
    apply_screen(&state, &context, id, CaseScreen::Hr, payload.into()).await
}

/// Finance screen update
#[utoipa::path(
    patch,
    path = "/cases/{id}/finance",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    request_body = FinanceUpdateRequest,
    responses(
        (status = 200, description = "Updated case", body = OffboardingCase),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - finance or admin only"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn update_as_finance(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<FinanceUpdateRequest>,
) -> AppResult<Json<OffboardingCase>> {
    apply_screen(&state, &context, id, CaseScreen::Finance, payload.into()).await
}

/// Leaver screen update
#[utoipa::path(
    patch,
    path = "/cases/{id}/leaver",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    request_body = LeaverUpdateRequest,
    responses(
        (status = 200, description = "Updated case", body = OffboardingCase),
        (status = 403, description = "Forbidden - leaver or admin only"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn update_as_leaver(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<LeaverUpdateRequest>,
) -> AppResult<Json<OffboardingCase>> {
    apply_screen(&state, &context, id, CaseScreen::Leaver, payload.into()).await
}

/// Upload a resignation or handover document
///
/// Multipart form with a `kind` text field (`resignation` or `handover`)
/// and a `file` part.
#[utoipa::path(
    post,
    path = "/cases/{id}/documents",
    tag = "Cases",
    security(("session_cookie" = [])),
    params(("id" = i32, Path, description = "Case ID")),
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "`kind` and `file` parts"),
    responses(
        (status = 200, description = "Stored document and updated case", body = DocumentResponse),
        (status = 400, description = "Missing part or empty file"),
        (status = 413, description = "File too large"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Case not found"),
        (status = 502, description = "Drive upload failed")
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<DocumentResponse>> {
    let upload = read_upload(multipart).await?;

    let (case, file) = state
        .case_service
        .attach_document(&context.user, id, upload)
        .await?;

    Ok(Json(DocumentResponse { case, file }))
}

async fn read_upload(mut multipart: Multipart) -> AppResult<DocumentUpload> {
    let mut kind: Option<DocumentKind> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "kind" => {
                let text = field.text().await.map_err(multipart_error)?;
                kind = Some(text.trim().parse()?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, mime_type, content.to_vec()));
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| AppError::validation("Document kind is required"))?;
    let (filename, mime_type, content) =
        file.ok_or_else(|| AppError::validation("File is required"))?;

    Ok(DocumentUpload {
        kind,
        filename,
        mime_type,
        content,
    })
}

/// Body-limit hits keep their 413; every other multipart fault is a 400.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File exceeds {} MiB",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        ))
    } else {
        AppError::bad_request(e.body_text())
    }
}
