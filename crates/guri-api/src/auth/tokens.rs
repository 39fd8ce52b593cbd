use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use guri_types::{Role, User};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> ApiResult<i64> {
        self.sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Malformed token subject".to_string()))
    }
}

/// HS256 signing and verification keys
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(decoded) => Ok(decoded.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(ApiError::Unauthorized("Token expired".to_string()))
                }
                _ => {
                    tracing::debug!(error = %e, "rejected bearer token");
                    Err(ApiError::Unauthorized("Invalid token".to_string()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 42,
            name: "Yusuf".to_string(),
            email: "yusuf@guri.so".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    const SECRET: &str = "test-secret-that-is-long-enough-000";

    #[test]
    fn test_issue_and_verify() {
        let keys = TokenKeys::new(SECRET, Duration::hours(1));
        let token = keys.issue(&user(Role::Agent)).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Agent);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = TokenKeys::new(SECRET, Duration::hours(-1));
        let token = keys.issue(&user(Role::Admin)).unwrap();

        let err = keys.verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let ours = TokenKeys::new(SECRET, Duration::hours(1));
        let theirs = TokenKeys::new("another-secret-that-is-long-enough-1", Duration::hours(1));
        let token = theirs.issue(&user(Role::Admin)).unwrap();

        assert!(matches!(ours.verify(&token), Err(ApiError::Unauthorized(_))));
    }
}
