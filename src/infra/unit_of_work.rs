//! Unit of Work: one place to reach every repository.
//!
//! Case writes are single statements and chat linking opens its own
//! transaction inside the user repository, so this only hands out
//! repositories sharing one connection pool.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{CaseRepository, CaseStore, UserRepository, UserStore};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get offboarding case repository
    fn cases(&self) -> Arc<dyn CaseRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    case_repo: Arc<CaseStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            case_repo: Arc::new(CaseStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn cases(&self) -> Arc<dyn CaseRepository> {
        self.case_repo.clone()
    }
}
