//! Google Drive document upload client.
//!
//! Credentials come from a service account (inline JSON or file) or, failing
//! that, an authorized-user token file written by `drive-auth`. Uploads are a
//! single `multipart/related` request; there is no resumable session.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, DRIVE_FILE_FIELDS, DRIVE_SCOPES, DRIVE_UPLOAD_BASE, GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI,
    SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const NO_CREDENTIALS: &str = "No Drive credentials. Set service account env or provide token.json";

/// Refresh a cached access token this long before it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Metadata of an uploaded file, as returned by Drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DriveFile {
    /// Link stored on the case: the viewer link when Drive returns one.
    pub fn link(&self) -> String {
        self.web_view_link
            .clone()
            .or_else(|| self.web_content_link.clone())
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", self.id))
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upload bytes as a new file. `folder_id` overrides the configured default folder.
    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        filename: String,
        mime_type: String,
        folder_id: Option<String>,
    ) -> AppResult<DriveFile>;
}

// =============================================================================
// Credentials
// =============================================================================

/// Service account key file contents (the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// OAuth authorized-user token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Debug, Clone)]
pub enum DriveCredentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

impl DriveCredentials {
    /// Service account first, then the token file.
    ///
    /// A service account value that fails to parse is skipped, not fatal.
    pub fn resolve(config: &Config) -> AppResult<Self> {
        if let Some(key) = Self::service_account(config) {
            return Ok(DriveCredentials::ServiceAccount(key));
        }

        let token_path = Path::new(&config.google_oauth_token_file);
        if token_path.exists() {
            let raw = std::fs::read_to_string(token_path).map_err(|e| {
                AppError::Credentials(format!("Cannot read {}: {}", token_path.display(), e))
            })?;
            let user: AuthorizedUser = serde_json::from_str(&raw).map_err(|e| {
                AppError::Credentials(format!("Invalid token file {}: {}", token_path.display(), e))
            })?;
            tracing::info!(path = %token_path.display(), "Using OAuth token file for Drive");
            return Ok(DriveCredentials::AuthorizedUser(user));
        }

        Err(AppError::Credentials(NO_CREDENTIALS.to_string()))
    }

    fn service_account(config: &Config) -> Option<ServiceAccountKey> {
        let raw = match (
            config.google_service_account_json(),
            config.google_service_account_file.as_deref(),
        ) {
            (Some(json), _) => json.to_string(),
            (None, Some(path)) => match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path, error = %e, "Service account file unreadable, trying token file");
                    return None;
                }
            },
            (None, None) => return None,
        };

        match serde_json::from_str::<ServiceAccountKey>(&raw) {
            Ok(key) => {
                tracing::info!(client_email = %key.client_email, "Using service account for Drive");
                Some(key)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Service account JSON invalid, trying token file");
                None
            }
        }
    }

    fn token_uri(&self) -> &str {
        match self {
            DriveCredentials::ServiceAccount(key) => &key.token_uri,
            DriveCredentials::AuthorizedUser(user) => &user.token_uri,
        }
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl<'a> AssertionClaims<'a> {
    fn new(key: &'a ServiceAccountKey, now: i64) -> Self {
        Self {
            iss: &key.client_email,
            scope: DRIVE_SCOPES.join(" "),
            aud: &key.token_uri,
            iat: now,
            exp: now + SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS,
        }
    }
}

/// Sign the RS256 JWT a service account exchanges for an access token.
fn sign_assertion(key: &ServiceAccountKey) -> AppResult<String> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| AppError::Credentials(format!("Invalid service account key: {}", e)))?;

    let header = Header {
        kid: key.private_key_id.clone(),
        ..Header::new(Algorithm::RS256)
    };
    let claims = AssertionClaims::new(key, Utc::now().timestamp());

    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| AppError::Credentials(format!("Failed to sign assertion: {}", e)))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

// =============================================================================
// Client
// =============================================================================

pub struct DriveClient {
    http: reqwest::Client,
    credentials: DriveCredentials,
    upload_base: String,
    default_folder_id: Option<String>,
    token: Mutex<Option<AccessToken>>,
}

impl DriveClient {
    pub fn new(credentials: DriveCredentials, default_folder_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            upload_base: DRIVE_UPLOAD_BASE.to_string(),
            default_folder_id,
            token: Mutex::new(None),
        }
    }

    /// Resolve credentials from configuration and build a client.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let credentials = DriveCredentials::resolve(config)?;
        Ok(Self::new(credentials, config.gdrive_folder_id.clone()))
    }

    /// Point uploads at another host.
    pub fn with_upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = base.into();
        self
    }

    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let form: Vec<(&str, String)> = match &self.credentials {
            DriveCredentials::ServiceAccount(key) => vec![
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string()),
                ("assertion", sign_assertion(key)?),
            ],
            DriveCredentials::AuthorizedUser(user) => vec![
                ("grant_type", "refresh_token".to_string()),
                ("client_id", user.client_id.clone()),
                ("client_secret", user.client_secret.clone()),
                ("refresh_token", user.refresh_token.clone()),
            ],
        };

        let token = request_token(&self.http, self.credentials.token_uri(), &form).await?;
        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.unwrap_or(3600)),
        });
        tracing::debug!("Drive access token refreshed");

        Ok(value)
    }
}

async fn request_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, String)],
) -> AppResult<TokenResponse> {
    let response = http
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| AppError::Credentials(format!("Token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Credentials(format!(
            "Token endpoint returned {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Credentials(format!("Invalid token response: {}", e)))
}

/// Build a `multipart/related` body: JSON metadata part, then the media part.
fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl DocumentStore for DriveClient {
    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        filename: String,
        mime_type: String,
        folder_id: Option<String>,
    ) -> AppResult<DriveFile> {
        let token = self.access_token().await?;

        let mut metadata = serde_json::json!({ "name": filename });
        if let Some(folder) = folder_id.or_else(|| self.default_folder_id.clone()) {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let boundary = format!("drive-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &mime_type, &content);
        let url = format!(
            "{}/upload/drive/v3/files",
            self.upload_base.trim_end_matches('/')
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", DRIVE_FILE_FIELDS),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::upload(format!("Drive request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upload(format!("Drive returned {}: {}", status, body)));
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| AppError::upload(format!("Invalid Drive response: {}", e)))?;

        tracing::info!(file_id = %file.id, name = %file.name, size = content.len(), "Uploaded document to Drive");
        Ok(file)
    }
}

// =============================================================================
// Installed-app OAuth (drive-auth command)
// =============================================================================

/// The `installed` (or `web`) block of a downloaded `client_secret.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClient>,
    web: Option<OAuthClient>,
}

impl OAuthClient {
    pub fn from_client_secret_json(raw: &str) -> AppResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(raw)
            .map_err(|e| AppError::Credentials(format!("Invalid client secret file: {}", e)))?;

        file.installed.or(file.web).ok_or_else(|| {
            AppError::Credentials("Client secret file has no installed or web client".to_string())
        })
    }

    /// Consent URL that sends the code back to `redirect_uri`.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> AppResult<Url> {
        let scope = DRIVE_SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Credentials(format!("Invalid auth URI: {}", e)))
    }

    /// Trade an authorization code for a refresh token.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<AuthorizedUser> {
        let form = [
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("redirect_uri", redirect_uri.to_string()),
        ];

        let token = request_token(&reqwest::Client::new(), &self.token_uri, &form).await?;
        let refresh_token = token.refresh_token.ok_or_else(|| {
            AppError::Credentials("Token response carried no refresh token".to_string())
        })?;

        Ok(AuthorizedUser {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token,
            token_uri: self.token_uri.clone(),
            token: Some(token.access_token),
            scopes: DRIVE_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }
}
