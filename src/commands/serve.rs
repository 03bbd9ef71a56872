//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{
    connect_session_store, ChatNotifier, Database, DocumentStore, DriveClient, TelegramClient,
};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database (pending migrations are applied)
    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!(source = ?config.database_source, "Database connected");

    let sessions = connect_session_store(&config).await?;

    // A configured token must be well formed; no token means no notifications
    let notifier: Option<Arc<dyn ChatNotifier>> = match config.telegram_bot_token() {
        Some(token) => Some(Arc::new(TelegramClient::new(Some(token))?)),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN is not set, case notifications are disabled");
            None
        }
    };

    let documents: Option<Arc<dyn DocumentStore>> = match DriveClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "Drive uploads are disabled");
            None
        }
    };

    let addr = args.bind_addr(&config);
    let app_state = AppState::from_config(db, sessions, config, notifier, documents);

    // Build router
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
