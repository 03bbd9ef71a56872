//! Use cases shared by the HTTP handlers and the CLI.
//!
//! Services see storage only through `UnitOfWork` and the outbound clients
//! only through `ChatNotifier` and `DocumentStore`, so each can be mocked.

mod auth_service;
mod case_service;
pub mod container;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{current_user, AuthService, Authenticator};
pub use case_service::{CaseManager, CaseScreen, CaseService, DocumentUpload};
pub use user_service::{NewAccount, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
