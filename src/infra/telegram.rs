//! Telegram Bot API client (long polling and plain-text messages).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tokio::time::Duration;

use crate::config::{TELEGRAM_API_BASE, TELEGRAM_POLL_TIMEOUT_SECONDS, TELEGRAM_TOKEN_PATTERN};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(TELEGRAM_TOKEN_PATTERN).expect("token regex is valid"));

/// Reject a missing or malformed bot token before any network call.
pub fn validate_bot_token(token: Option<&str>) -> AppResult<&str> {
    let token = token
        .ok_or_else(|| AppError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

    if !TOKEN_RE.is_match(token) {
        return Err(AppError::Config(
            "TELEGRAM_BOT_TOKEN is malformed (expected <bot id>:<secret>)".to_string(),
        ));
    }

    Ok(token)
}

/// Outbound chat messages, as used by case notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, chat_id: String, text: String) -> AppResult<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// Build a client for a validated token.
    pub fn new(token: Option<&str>) -> AppResult<Self> {
        let token = validate_bot_token(token)?.to_string();

        // getUpdates holds the request open for the poll timeout
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(TELEGRAM_POLL_TIMEOUT_SECONDS + 10))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: TELEGRAM_API_BASE.to_string(),
            token,
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, String> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            // Without the URL: it contains the token
            .map_err(|e| format!("{} request failed: {}", method, e.without_url()))?;

        let status = response.status();
        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            format!("{} returned {} with unreadable body: {}", method, status, e.without_url())
        })?;

        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(format!(
                "{} failed: {}",
                method,
                body.description.unwrap_or_else(|| status.to_string())
            )),
        }
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> AppResult<Vec<Update>> {
        let mut payload = json!({
            "timeout": timeout_seconds,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        self.call("getUpdates", payload).await.map_err(AppError::Notify)
    }

    /// Username of the bot behind the token; `None` when Telegram reports none.
    pub async fn get_me(&self) -> AppResult<Option<String>> {
        #[derive(Deserialize)]
        struct BotUser {
            username: Option<String>,
        }

        let me: BotUser = self.call("getMe", json!({})).await.map_err(AppError::Notify)?;
        Ok(me.username.filter(|name| !name.trim().is_empty()))
    }
}

#[async_trait]
impl ChatNotifier for TelegramClient {
    async fn send_message(&self, chat_id: String, text: String) -> AppResult<()> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await
            .map_err(AppError::notify)?;
        Ok(())
    }
}
