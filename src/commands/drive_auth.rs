//! Drive auth command - Installed-app OAuth flow for Drive uploads.
//!
//! Prints the consent URL, receives the authorization code on a loopback
//! listener and writes the authorized-user token file that uploads read.

use std::path::PathBuf;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::cli::args::DriveAuthArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::drive::OAuthClient;

/// Execute the drive-auth command
pub async fn execute(args: DriveAuthArgs, config: Config) -> AppResult<()> {
    let raw = tokio::fs::read_to_string(&args.client_secret)
        .await
        .map_err(|e| {
            AppError::Credentials(format!(
                "Cannot read {}: {}",
                args.client_secret.display(),
                e
            ))
        })?;
    let client = OAuthClient::from_client_secret_json(&raw)?;

    let listener = TcpListener::bind(("127.0.0.1", args.port))
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind loopback listener: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| AppError::internal(e.to_string()))?
        .port();

    let redirect_uri = format!("http://127.0.0.1:{}/", port);
    let state = Uuid::new_v4().simple().to_string();
    let url = client.authorization_url(&redirect_uri, &state)?;

    println!("Open this URL in a browser to authorize Drive access:\n\n{}\n", url);

    let code = wait_for_code(listener, state).await?;
    let authorized = client.exchange_code(&code, &redirect_uri).await?;

    let path = args
        .token_file
        .unwrap_or_else(|| PathBuf::from(&config.google_oauth_token_file));
    let json = serde_json::to_string_pretty(&authorized)
        .map_err(|e| AppError::internal(format!("Token serialization failed: {}", e)))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| AppError::internal(format!("Cannot write {}: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), "Drive token written");
    println!("OAuth OK. Token written to {}", path.display());
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

type CallbackState = (mpsc::Sender<AppResult<String>>, String);

/// Serve the redirect URI until one callback arrives (or Ctrl+C).
async fn wait_for_code(listener: TcpListener, expected_state: String) -> AppResult<String> {
    let (tx, mut rx) = mpsc::channel::<AppResult<String>>(1);
    let app = Router::new()
        .route("/", get(callback))
        .with_state((tx, expected_state));
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let outcome = tokio::select! {
        received = rx.recv() => received.unwrap_or_else(|| {
            Err(AppError::Credentials("Authorization was not completed".to_string()))
        }),
        _ = tokio::signal::ctrl_c() => {
            Err(AppError::Credentials("Authorization cancelled".to_string()))
        }
    };

    server.abort();
    outcome
}

async fn callback(
    State((tx, expected_state)): State<CallbackState>,
    Query(query): Query<OAuthCallback>,
) -> &'static str {
    let outcome = check_callback(query, &expected_state);
    let page = if outcome.is_ok() {
        "Authorization complete. You can close this tab."
    } else {
        "Authorization failed. Check the terminal."
    };

    if tx.send(outcome).await.is_err() {
        tracing::debug!("callback arrived after the flow finished");
    }
    page
}

fn check_callback(query: OAuthCallback, expected_state: &str) -> AppResult<String> {
    if let Some(error) = query.error {
        return Err(AppError::Credentials(format!("Authorization denied: {}", error)));
    }
    if query.state.as_deref() != Some(expected_state) {
        return Err(AppError::Credentials("OAuth state mismatch".to_string()));
    }
    query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::Credentials("No authorization code in redirect".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> OAuthCallback {
        OAuthCallback {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_callback_returns_code_for_matching_state() {
        let code = check_callback(redirect(Some("4/abc"), Some("s1"), None), "s1").unwrap();
        assert_eq!(code, "4/abc");
    }

    #[test]
    fn test_callback_rejects_bad_redirects() {
        for query in [
            redirect(Some("4/abc"), Some("other"), None),
            redirect(Some("4/abc"), None, None),
            redirect(None, Some("s1"), None),
            redirect(None, Some("s1"), Some("access_denied")),
        ] {
            assert!(matches!(
                check_callback(query, "s1"),
                Err(AppError::Credentials(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_loopback_listener_delivers_code() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(wait_for_code(listener, "s1".to_string()));

        let body = reqwest::get(format!("http://{}/?code=4%2Fabc&state=s1", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(body.contains("complete"));
        assert_eq!(waiting.await.unwrap().unwrap(), "4/abc");
    }
}
