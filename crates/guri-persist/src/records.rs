//! Store-side records that never travel over the public API as-is.

use chrono::{DateTime, Utc};
use guri_types::{Role, User};

/// Emails are unique case-insensitively; every write and lookup goes through this
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account row to insert; the password is already hashed by the caller
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// A user together with its stored password hash, for login checks only
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub user_id: i64,
    /// Hex SHA-256 of the emailed token; the raw token is never stored
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordResetToken {
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}
