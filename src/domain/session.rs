//! Server-side session state and the authentication gate that writes to it.
//!
//! A `Session` is an explicit value loaded per request; nothing here is global.
//! Login writes five `auth_*` keys, logout removes exactly those keys and
//! leaves anything else a screen stored in the session alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::user::{Role, User};
use crate::config::{
    AUTH_SESSION_KEYS, SESSION_KEY_AUTHENTICATED, SESSION_KEY_EMAIL, SESSION_KEY_NAME,
    SESSION_KEY_ROLE, SESSION_KEY_USER_ID,
};

/// Key/value session state identified by an opaque id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    values: BTreeMap<String, Value>,
}

impl Session {
    /// Start an empty session with a fresh random id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().simple().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Give the session a fresh id, keeping its values. Returns the old id.
    pub fn rotate_id(&mut self) -> String {
        std::mem::replace(&mut self.id, Uuid::new_v4().simple().to_string())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The authenticated identity as recorded in the session at login time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Record a successful login in the session.
pub fn set_logged_in(session: &mut Session, user: &User) {
    session.insert(SESSION_KEY_AUTHENTICATED, true);
    session.insert(SESSION_KEY_USER_ID, user.id);
    session.insert(SESSION_KEY_EMAIL, user.email.clone());
    session.insert(SESSION_KEY_NAME, user.name.clone());
    session.insert(SESSION_KEY_ROLE, user.role.as_str());
}

/// True iff the authenticated flag is present and truthy.
pub fn is_logged_in(session: &Session) -> bool {
    session
        .get(SESSION_KEY_AUTHENTICATED)
        .map(is_truthy)
        .unwrap_or(false)
}

/// Remove exactly the authentication keys from the session.
pub fn do_logout(session: &mut Session) {
    for key in AUTH_SESSION_KEYS {
        session.remove(key);
    }
}

/// User id stored at login, if any.
pub fn session_user_id(session: &Session) -> Option<i32> {
    session
        .get(SESSION_KEY_USER_ID)
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .filter(|id| *id != 0)
}

/// Rebuild the logged-in identity from the session keys.
///
/// Returns `None` when not logged in or when any key is missing or malformed.
pub fn session_user(session: &Session) -> Option<SessionUser> {
    if !is_logged_in(session) {
        return None;
    }

    let text = |key: &str| session.get(key).and_then(Value::as_str).map(str::to_string);

    Some(SessionUser {
        id: session_user_id(session)?,
        email: text(SESSION_KEY_EMAIL)?,
        name: text(SESSION_KEY_NAME)?,
        role: text(SESSION_KEY_ROLE)?.parse().ok()?,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user() -> User {
        User {
            id: 3,
            email: "hr@example.com".to_string(),
            password_hash: "hashed".to_string(),
            name: "HR Lee".to_string(),
            role: Role::Hr,
            telegram_chat_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_session_is_logged_out() {
        let session = Session::new();
        assert!(!is_logged_in(&session));
        assert!(session_user(&session).is_none());
        assert_eq!(session.id().len(), 32);
    }

    #[test]
    fn test_set_logged_in_writes_identity() {
        let mut session = Session::new();
        set_logged_in(&mut session, &user());

        assert!(is_logged_in(&session));
        assert_eq!(
            session_user(&session),
            Some(SessionUser {
                id: 3,
                email: "hr@example.com".to_string(),
                name: "HR Lee".to_string(),
                role: Role::Hr,
            })
        );
        assert_eq!(session.get(SESSION_KEY_ROLE), Some(&Value::from("hr")));
    }

    #[test]
    fn test_logout_removes_only_auth_keys() {
        let mut session = Session::new();
        session.insert("selected_case_id", 7);
        set_logged_in(&mut session, &user());

        do_logout(&mut session);

        assert!(!is_logged_in(&session));
        assert!(session_user_id(&session).is_none());
        for key in AUTH_SESSION_KEYS {
            assert!(!session.contains_key(key));
        }
        assert_eq!(session.get("selected_case_id"), Some(&Value::from(7)));
    }

    #[test]
    fn test_authenticated_flag_truthiness() {
        let mut session = Session::new();
        for (value, expected) in [
            (Value::Bool(false), false),
            (Value::Null, false),
            (Value::from(0), false),
            (Value::from(""), false),
            (Value::from(1), true),
            (Value::from("yes"), true),
            (Value::Bool(true), true),
        ] {
            session.insert(SESSION_KEY_AUTHENTICATED, value.clone());
            assert_eq!(is_logged_in(&session), expected, "flag {:?}", value);
        }
    }

    #[test]
    fn test_session_user_requires_every_key() {
        let mut session = Session::new();
        set_logged_in(&mut session, &user());
        session.insert(SESSION_KEY_ROLE, "owner");

        assert!(is_logged_in(&session));
        assert!(session_user(&session).is_none());
    }

    #[test]
    fn test_rotate_id_keeps_values() {
        let mut session = Session::with_id("old");
        session.insert("selected_case_id", 7);

        assert_eq!(session.rotate_id(), "old");
        assert_ne!(session.id(), "old");
        assert_eq!(session.get("selected_case_id"), Some(&Value::from(7)));
    }

    #[test]
    fn test_session_serializes_with_values() {
        let mut session = Session::with_id("abc");
        set_logged_in(&mut session, &user());

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
