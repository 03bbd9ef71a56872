//! Password value object - Domain layer password handling.
//!
//! Centralizes the Argon2 configuration used for hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a new password after checking the length policy.
    ///
    /// # Errors
    /// Returns validation error if password is too short.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        Self::new_unchecked(plain_text)
    }

    /// Hash a password without the length policy (fixed development accounts).
    pub fn new_unchecked(plain_text: &str) -> AppResult<Self> {
        if plain_text.is_empty() {
            return Err(AppError::validation("Password must not be empty"));
        }
        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        verify_password(plain_text, &self.hash)
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

/// Check a plaintext password against a stored hash.
///
/// New hashes are Argon2. Rows carried over from the earlier deployment hold
/// bcrypt (`$2a$`, `$2b$`, `$2y$`) hashes and are checked with bcrypt.
/// Returns `false` for empty input, a malformed hash or any hashing error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    if plain.is_empty() || hashed.is_empty() {
        return false;
    }

    if is_bcrypt(hashed) {
        return bcrypt::verify(plain, hashed).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "stored bcrypt hash could not be checked");
            false
        });
    }

    match PasswordHash::new(hashed) {
        Ok(parsed) => Password::argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::debug!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}

fn is_bcrypt(hashed: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|prefix| hashed.starts_with(prefix))
}
