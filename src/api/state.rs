//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{ChatNotifier, Database, DocumentStore, SessionStore};
use crate::services::{AuthService, CaseService, ServiceContainer, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Case screens
    pub case_service: Arc<dyn CaseService>,
    /// Server-side sessions
    pub sessions: Arc<dyn SessionStore>,
    /// Database connection
    pub database: Arc<Database>,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    /// Create application state from the database, session store and outbound clients.
    pub fn from_config(
        database: Arc<Database>,
        sessions: Arc<dyn SessionStore>,
        config: Config,
        notifier: Option<Arc<dyn ChatNotifier>>,
        documents: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        let cookie_secure = config.cookie_secure;
        let container = Services::from_connection(
            database.conn(),
            config,
            notifier,
            documents,
        );

        Self::new(&container, sessions, database, cookie_secure)
    }

    /// Create application state over any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        sessions: Arc<dyn SessionStore>,
        database: Arc<Database>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            case_service: services.cases(),
            sessions,
            database,
            cookie_secure,
        }
    }
}
