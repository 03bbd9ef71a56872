//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, case_handler, user_handler};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{CaseStatus, DocumentKind, OffboardingCase, PlanOption, Role, UserResponse};
use crate::infra::DriveFile;

/// OpenAPI documentation for the offboarding tracker
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Offboarding Tracker",
        version = "0.1.0",
        description = "HR offboarding cases with manager, HR, finance and leaver screens",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8501", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        // Case endpoints
        case_handler::list_cases,
        case_handler::create_case,
        case_handler::get_case,
        case_handler::case_link,
        case_handler::update_as_manager,
        case_handler::update_as_hr,
        case_handler::update_as_finance,
        case_handler::update_as_leaver,
        case_handler::upload_document,
        // User endpoints
        user_handler::list_users,
        user_handler::create_user,
        user_handler::get_user,
    ),
    components(
        schemas(
            // Domain types
            Role,
            UserResponse,
            CaseStatus,
            PlanOption,
            DocumentKind,
            OffboardingCase,
            DriveFile,
            // Request/response types
            auth_handler::LoginRequest,
            case_handler::CreateCaseRequest,
            case_handler::ManagerUpdateRequest,
            case_handler::HrUpdateRequest,
            case_handler::FinanceUpdateRequest,
            case_handler::LeaverUpdateRequest,
            case_handler::CaseLinkResponse,
            case_handler::DocumentResponse,
            case_handler::UploadForm,
            user_handler::CreateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Session login and logout"),
        (name = "Cases", description = "Offboarding cases and role screens"),
        (name = "Users", description = "Account administration")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Session id set by /auth/login",
                ))),
            );
        }
    }
}
