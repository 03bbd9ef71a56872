//! Records and rules of the tracker: accounts and roles, offboarding cases,
//! the session login gate and password hashing.

pub mod case;
pub mod password;
pub mod session;
pub mod user;

pub use case::{CaseChanges, CaseFilter, CaseStatus, DocumentKind, NewCase, OffboardingCase, PlanOption};
pub use password::{verify_password, Password};
pub use session::{do_logout, is_logged_in, session_user, set_logged_in, Session, SessionUser};
pub use user::{normalize_email, NewUser, Role, User, UserResponse};
