//! Accounts and the five stakeholder roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ROLE_ADMIN, ROLE_FINANCE, ROLE_HR, ROLE_LEAVER, ROLE_MANAGER};
use crate::errors::AppError;

/// Organizational role of a user.
///
/// Encoded as the lowercase role name in the database, JSON and bot replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Hr,
    Finance,
    Leaver,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Manager, Role::Hr, Role::Finance, Role::Leaver];

    /// Storage and wire encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Hr => ROLE_HR,
            Role::Finance => ROLE_FINANCE,
            Role::Leaver => ROLE_LEAVER,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Admins pass every role check.
    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        self.is_admin() || allowed.contains(self)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown role: {}", s)))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account. `telegram_chat_id` is set once the user links the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub telegram_chat_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_chat_linked(&self) -> bool {
        self.telegram_chat_id.is_some()
    }
}

/// Normalize an email the way it is stored: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account as shown to clients: no hash, chat id reduced to a flag.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "hr@example.com")]
    pub email: String,
    #[schema(example = "HR Lee")]
    pub name: String,
    pub role: Role,
    /// Whether the user has linked a Telegram chat
    pub chat_linked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            chat_linked: user.is_chat_linked(),
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_contract() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(role.to_string(), role.as_str());
        }
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"hr\"");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("owner".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_admin_passes_every_role_check() {
        assert!(Role::Admin.is_any_of(&[Role::Hr]));
        assert!(Role::Hr.is_any_of(&[Role::Hr, Role::Finance]));
        assert!(!Role::Leaver.is_any_of(&[Role::Manager]));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Mgr@Example.COM "), "mgr@example.com");
    }
}
