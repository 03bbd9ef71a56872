//! Service Container - Centralized service access.
//!
//! Builds every service over one shared Unit of Work so the HTTP state and
//! the CLI commands wire services the same way.

use std::sync::Arc;

use super::{AuthService, Authenticator, CaseManager, CaseService, UserManager, UserService};
use crate::config::Config;
use crate::infra::{ChatNotifier, DocumentStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn cases(&self) -> Arc<dyn CaseService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    case_service: Arc<dyn CaseService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        case_service: Arc<dyn CaseService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            case_service,
        }
    }

    /// Create service container from a database connection and the outbound clients.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        notifier: Option<Arc<dyn ChatNotifier>>,
        documents: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone())),
            user_service: Arc::new(UserManager::new(uow.clone())),
            case_service: Arc::new(CaseManager::new(uow, config, notifier, documents)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn cases(&self) -> Arc<dyn CaseService> {
        self.case_service.clone()
    }
}
