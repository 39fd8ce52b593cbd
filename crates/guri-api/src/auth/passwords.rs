use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use guri_persist::SeedAccounts;

use crate::error::{ApiError, ApiResult};

/// Argon2id PHC string
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// False for a wrong password and for an unparseable stored hash alike
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a PHC string");
            false
        }
    }
}

/// [`hash_password`] on the blocking pool; request handlers use this one
pub async fn hash_password_async(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool
pub async fn verify_password_async(password: String, stored_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {}", e)))
}

/// Hash the passwords given to the seeded admin and agent logins
pub fn seed_accounts(admin_password: &str, agent_password: &str) -> ApiResult<SeedAccounts> {
    Ok(SeedAccounts {
        admin_password_hash: hash_password(admin_password)?,
        agent_password_hash: hash_password(agent_password)?,
    })
}

/// 256 random bits, hex encoded; handed to the user once and never stored
pub fn new_reset_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// What the store keeps instead of the raw reset token
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[tokio::test]
    async fn test_async_helpers_match_sync() {
        let hash = hash_password_async("correct horse".to_string()).await.unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(verify_password_async("correct horse".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_async("wrong horse".to_string(), hash).await.unwrap());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_reset_tokens() {
        let token = new_reset_token();
        assert_eq!(token.len(), 64);
        assert_ne!(token, new_reset_token());

        let hash = hash_reset_token(&token);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_reset_token(&format!(" {} ", token)));
        assert_ne!(hash, token);
    }
}
