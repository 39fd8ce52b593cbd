use reqwest::Method;

use guri_types::{
    AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
    ResetPasswordRequest, User,
};

use crate::client::GuriClient;
use crate::error::Result;
use crate::session::Session;

impl GuriClient {
    /// Create an account and log in as it
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let builder = self.anonymous(Method::POST, "/auth/register").json(request);
        let auth: AuthResponse = self.send(builder).await?;
        Ok(self.start_session(auth).await)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self.anonymous(Method::POST, "/auth/login").json(&body);
        let auth: AuthResponse = self.send(builder).await?;
        Ok(self.start_session(auth).await)
    }

    /// Resume a session from a token kept by the caller; the token is checked
    /// against `/auth/me` before the session switches over
    pub async fn restore(&self, token: &str) -> Result<User> {
        let builder = self.anonymous(Method::GET, "/auth/me").bearer_auth(token);
        let user: User = self.send(builder).await?;
        self.set_session(Session::Authenticated {
            token: token.to_string(),
            user: user.clone(),
        })
        .await;
        Ok(user)
    }

    /// Tokens are stateless on the server, so this only forgets the local session
    pub async fn logout(&self) {
        self.set_session(Session::Anonymous).await;
    }

    pub async fn me(&self) -> Result<User> {
        let builder = self.authed(Method::GET, "/auth/me").await?;
        self.send(builder).await
    }

    /// Start a password reset. Returns the raw token only when the server is
    /// configured to expose it.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        let builder = self.anonymous(Method::POST, "/auth/forgot-password").json(&body);
        let response: ForgotPasswordResponse = self.send(builder).await?;
        Ok(response.reset_token)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<()> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        let builder = self.anonymous(Method::POST, "/auth/reset-password").json(&body);
        self.send_empty(builder).await
    }

    async fn start_session(&self, auth: AuthResponse) -> User {
        tracing::info!(user_id = auth.user.id, role = %auth.user.role, "logged in");
        self.set_session(Session::Authenticated {
            token: auth.token,
            user: auth.user.clone(),
        })
        .await;
        auth.user
    }
}
