use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use std::sync::Arc;

use guri_persist::NewUser;
use guri_types::{
    ApiResponse, AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    RegisterRequest, ResetPasswordRequest, Role, User, ValidationError,
};

use super::{created, done, ok, Envelope};
use crate::auth::{hash_password_async, hash_reset_token, new_reset_token, verify_password_async};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

fn session_for(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let token = state.tokens.issue(&user)?;
    Ok(AuthResponse { token, user })
}

/// Public sign-up; always creates a plain `user` account
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Envelope<AuthResponse>)> {
    req.validate()?;

    let password_hash = hash_password_async(req.password).await?;
    let user = state
        .persist
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = user.id, "account registered");
    Ok(created(session_for(&state, user)?))
}

#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Envelope<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let credentials = state
        .persist
        .find_credentials(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password_async(req.password, credentials.password_hash.clone()).await? {
        tracing::info!(user_id = credentials.user.id, "login rejected");
        return Err(invalid());
    }

    Ok(ok(session_for(&state, credentials.user)?))
}

pub async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Envelope<User>> {
    let account = state
        .persist
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;
    Ok(ok(account))
}

/// Answers the same way whether or not the email is registered
#[tracing::instrument(skip(state, req))]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<Envelope<ForgotPasswordResponse>> {
    let mut response = ForgotPasswordResponse::default();

    if let Some(credentials) = state.persist.find_credentials(&req.email).await? {
        let token = new_reset_token();
        let expires_at = Utc::now() + Duration::minutes(state.config.auth.reset_token_ttl_minutes);
        state
            .persist
            .store_reset_token(credentials.user.id, hash_reset_token(&token), expires_at)
            .await?;
        tracing::info!(user_id = credentials.user.id, %expires_at, "password reset issued");

        if state.config.auth.expose_reset_token {
            response.reset_token = Some(token);
        }
    }

    Ok(Json(
        ApiResponse::ok(response).with_message("If the account exists, a reset link has been sent"),
    ))
}

#[tracing::instrument(skip(state, req))]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Envelope<()>> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new("password", "must be at least 8 characters").into());
    }

    let user_id = state
        .persist
        .redeem_reset_token(&hash_reset_token(&req.token), Utc::now())
        .await?
        .ok_or_else(|| ApiError::BadRequest("reset token is invalid or expired".to_string()))?;

    let password_hash = hash_password_async(req.password).await?;
    if !state.persist.set_password_hash(user_id, password_hash).await? {
        return Err(ApiError::not_found("User", user_id));
    }

    tracing::info!(user_id, "password reset completed");
    Ok(done("Password updated"))
}
