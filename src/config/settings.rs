//! Application settings loaded from environment variables.

use std::env;

use reqwest::Url;

use super::constants::{
    DEFAULT_OAUTH_TOKEN_FILE, DEFAULT_PUBLIC_APP_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_TTL_SECONDS, SQLITE_FALLBACK_DIR, SQLITE_FALLBACK_FILE,
};

/// Where the database URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseSource {
    /// `DATABASE_URL` was set
    Url,
    /// Composed from the discrete `PG_*` variables
    PgParts,
    /// Local file-backed development database
    SqliteFallback,
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_source: DatabaseSource,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub server_host: String,
    pub server_port: u16,
    pub public_app_url: String,
    telegram_bot_token: Option<String>,
    google_service_account_json: Option<String>,
    pub google_service_account_file: Option<String>,
    pub google_oauth_token_file: String,
    pub gdrive_folder_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_source", &self.database_source)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("public_app_url", &self.public_app_url)
            .field("telegram_bot_token", &self.telegram_bot_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "google_service_account_json",
                &self.google_service_account_json.as_ref().map(|_| "[REDACTED]"),
            )
            .field("google_service_account_file", &self.google_service_account_file)
            .field("google_oauth_token_file", &self.google_oauth_token_file)
            .field("gdrive_folder_id", &self.gdrive_folder_id)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (database_url, database_source) = resolve_database_url(&get);

        Self {
            database_url,
            database_source,
            redis_url: get("REDIS_URL"),
            session_ttl_seconds: get("SESSION_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            cookie_secure: get("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: get("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            public_app_url: get("PUBLIC_APP_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_APP_URL.to_string()),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            google_service_account_json: get("GOOGLE_SERVICE_ACCOUNT_JSON"),
            google_service_account_file: get("GOOGLE_SERVICE_ACCOUNT_FILE"),
            google_oauth_token_file: get("GOOGLE_OAUTH_TOKEN_FILE")
                .unwrap_or_else(|| DEFAULT_OAUTH_TOKEN_FILE.to_string()),
            gdrive_folder_id: get("GDRIVE_FOLDER_ID"),
        }
    }

    /// Telegram bot token, if configured (shape is checked by the bot command).
    pub fn telegram_bot_token(&self) -> Option<&str> {
        self.telegram_bot_token.as_deref()
    }

    /// Inline service account JSON, if configured.
    pub fn google_service_account_json(&self) -> Option<&str> {
        self.google_service_account_json.as_deref()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Deep link that opens a case in the web app.
    pub fn case_link(&self, case_id: i32) -> String {
        format!("{}/?case_id={}", self.public_app_url.trim_end_matches('/'), case_id)
    }

    pub fn is_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }
}

fn resolve_database_url<G>(get: &G) -> (String, DatabaseSource)
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("DATABASE_URL") {
        return (url, DatabaseSource::Url);
    }

    let parts = (
        get("PG_HOST"),
        get("PG_USER"),
        get("PG_PASSWORD"),
        get("PG_PORT"),
        get("PG_DB"),
    );
    if let (Some(host), Some(user), Some(password), Some(port), Some(db)) = parts {
        match compose_postgres_url(&host, &user, &password, &port, &db) {
            Some(url) => return (url, DatabaseSource::PgParts),
            None => tracing::warn!(host = %host, port = %port, "PG_* settings are invalid, falling back to sqlite"),
        }
    }

    (
        format!("sqlite://{}/{}?mode=rwc", SQLITE_FALLBACK_DIR, SQLITE_FALLBACK_FILE),
        DatabaseSource::SqliteFallback,
    )
}

/// Compose a postgres URL; credentials are percent-encoded by `Url`.
fn compose_postgres_url(host: &str, user: &str, password: &str, port: &str, db: &str) -> Option<String> {
    let port: u16 = port.parse().ok()?;
    let mut url = Url::parse(&format!("postgres://{}", host)).ok()?;
    url.set_username(user).ok()?;
    url.set_password(Some(password)).ok()?;
    url.set_port(Some(port)).ok()?;
    url.set_path(db);
    url.query_pairs_mut().append_pair("sslmode", "require");
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const PG_PARTS: &[(&str, &str)] = &[
        ("PG_HOST", "db.local"),
        ("PG_USER", "app"),
        ("PG_PASSWORD", "p@ss/word"),
        ("PG_PORT", "5432"),
        ("PG_DB", "offboarding"),
    ];

    #[test]
    fn test_database_url_wins_over_pg_parts() {
        let mut vars = PG_PARTS.to_vec();
        vars.push(("DATABASE_URL", "postgres://u:p@h:1/db"));
        let config = config_with(&vars);

        assert_eq!(config.database_url, "postgres://u:p@h:1/db");
        assert_eq!(config.database_source, DatabaseSource::Url);
    }

    #[test]
    fn test_pg_parts_compose_url_with_sslmode() {
        let config = config_with(PG_PARTS);

        assert_eq!(config.database_source, DatabaseSource::PgParts);
        assert!(config.database_url.starts_with("postgres://app:"));
        assert!(config.database_url.contains("@db.local:5432/offboarding"));
        assert!(config.database_url.ends_with("?sslmode=require"));
        assert!(!config.database_url.contains("p@ss/word"));
    }

    #[test]
    fn test_incomplete_pg_parts_fall_back_to_sqlite() {
        let config = config_with(&PG_PARTS[..3]);

        assert_eq!(config.database_source, DatabaseSource::SqliteFallback);
        assert!(config.is_sqlite());
        assert_eq!(config.database_url, "sqlite://data/app.db?mode=rwc");
    }

    #[test]
    fn test_invalid_pg_port_falls_back_to_sqlite() {
        let mut vars = PG_PARTS.to_vec();
        vars[3] = ("PG_PORT", "not-a-port");
        let config = config_with(&vars);

        assert_eq!(config.database_source, DatabaseSource::SqliteFallback);
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);

        assert_eq!(config.server_port, 8501);
        assert_eq!(config.public_app_url, "http://localhost:8501");
        assert_eq!(config.google_oauth_token_file, "token.json");
        assert!(config.redis_url.is_none());
        assert!(config.telegram_bot_token().is_none());
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_with(&[("REDIS_URL", "  "), ("TELEGRAM_BOT_TOKEN", "")]);

        assert!(config.redis_url.is_none());
        assert!(config.telegram_bot_token().is_none());
    }

    #[test]
    fn test_case_link() {
        let config = config_with(&[("PUBLIC_APP_URL", "https://hr.example.com/")]);

        assert_eq!(config.case_link(42), "https://hr.example.com/?case_id=42");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_with(&[
            ("TELEGRAM_BOT_TOKEN", "123:secret"),
            ("DATABASE_URL", "postgres://u:hunter2@h/db"),
        ]);
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("123:secret"));
    }
}
