//! Request and response bodies of the auth and admin endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{User, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        super::models::require("name", &self.name)?;
        validate_credentials(&self.email, &self.password)
    }
}

/// Email shape and password length rules shared by registration and agent creation
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if !email.contains('@') {
        return Err(ValidationError::new("email", "must be a valid address"));
    }
    if password.len() < 8 {
        return Err(ValidationError::new("password", "must be at least 8 characters"));
    }
    Ok(())
}

/// Issued on login and registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// The raw reset token is only echoed back when the server runs with
/// `auth.expose_reset_token` (local development without a mailer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Row counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub properties: i64,
    pub featured_properties: i64,
    pub agents: i64,
    pub projects: i64,
    pub categories: i64,
    pub services: i64,
    pub contacts: i64,
    pub new_contacts: i64,
    pub stories: i64,
    pub live_stories: i64,
    pub users: i64,
}

/// Result of the admin purge of expired stories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub purged: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let mut request = RegisterRequest {
            name: "Amina".to_string(),
            email: "amina@guri.so".to_string(),
            password: "longenough".to_string(),
        };
        assert!(request.validate().is_ok());

        request.password = "short".to_string();
        assert_eq!(request.validate().unwrap_err().field, "password");

        request.password = "longenough".to_string();
        request.email = "nope".to_string();
        assert_eq!(request.validate().unwrap_err().field, "email");
    }

    #[test]
    fn test_reset_token_omitted_when_absent() {
        let body = serde_json::to_value(ForgotPasswordResponse::default()).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }
}
