//! Fixed values shared by the web app, the bot and the CLI.

// =============================================================================
// Pagination
// =============================================================================

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound for `per_page`
pub const MAX_PAGE_SIZE: u64 = 100;

pub const DEFAULT_PAGE_NUMBER: u64 = 1;

// =============================================================================
// Sessions
// =============================================================================

/// Cookie carrying the server-side session id
pub const SESSION_COOKIE_NAME: &str = "offboarding_sid";

/// Default session retention in seconds (7 days)
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 3600;

/// Key prefix for sessions stored in Redis
pub const CACHE_PREFIX_SESSION: &str = "session:";

/// Session keys written by a successful login
pub const SESSION_KEY_AUTHENTICATED: &str = "auth_is_authenticated";
pub const SESSION_KEY_USER_ID: &str = "auth_user_id";
pub const SESSION_KEY_EMAIL: &str = "auth_email";
pub const SESSION_KEY_NAME: &str = "auth_name";
pub const SESSION_KEY_ROLE: &str = "auth_role";

/// Exactly the keys removed on logout
pub const AUTH_SESSION_KEYS: &[&str] = &[
    SESSION_KEY_AUTHENTICATED,
    SESSION_KEY_USER_ID,
    SESSION_KEY_EMAIL,
    SESSION_KEY_NAME,
    SESSION_KEY_ROLE,
];

// =============================================================================
// User Roles
// =============================================================================

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_HR: &str = "hr";
pub const ROLE_FINANCE: &str = "finance";
pub const ROLE_LEAVER: &str = "leaver";

// =============================================================================
// Server Configuration
// =============================================================================

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8501;

/// Default base URL used when building case deep links
pub const DEFAULT_PUBLIC_APP_URL: &str = "http://localhost:8501";

// =============================================================================
// Database
// =============================================================================

/// Development fallback when neither DATABASE_URL nor PG_* are configured
pub const SQLITE_FALLBACK_DIR: &str = "data";
pub const SQLITE_FALLBACK_FILE: &str = "app.db";

/// Pool size for the primary connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Google Drive
// =============================================================================

pub const DRIVE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/drive",
];

pub const DEFAULT_OAUTH_TOKEN_FILE: &str = "token.json";

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com";

/// Fields requested back from the files.create call
pub const DRIVE_FILE_FIELDS: &str = "id,name,mimeType,webViewLink,webContentLink,parents";

/// Service account assertion lifetime in seconds
pub const SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS: i64 = 3600;

// =============================================================================
// Telegram
// =============================================================================

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Server-side long-poll timeout for getUpdates
pub const TELEGRAM_POLL_TIMEOUT_SECONDS: u64 = 30;

/// Pause after a failed getUpdates before polling again
pub const TELEGRAM_POLL_ERROR_PAUSE_SECONDS: u64 = 3;

/// Bot token shape: numeric bot id, colon, secret
pub const TELEGRAM_TOKEN_PATTERN: &str = r"^\d+:[A-Za-z0-9_-]+$";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length for accounts created through the API
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Largest document accepted by the upload endpoint (25 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 25 * 1024 * 1024;
