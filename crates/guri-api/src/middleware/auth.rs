//! Bearer-token extractors.
//!
//! Handlers state the caller they need in their signature: [`AuthUser`] for any
//! logged-in user, [`AdminUser`] for the back office, [`Publisher`] for admins and
//! agents posting listings and stories.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use guri_types::{Agent, Role};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn bearer_token(parts: &Parts) -> ApiResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Malformed authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = state.tokens.verify(bearer_token(parts)?)?;
        Ok(AuthUser {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}

/// Reload the caller's account so privileged extractors act on the stored role,
/// not the one baked into the token
async fn current_account(state: &AppState, user: AuthUser) -> ApiResult<AuthUser> {
    let account = state
        .persist
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;
    Ok(AuthUser {
        id: account.id,
        role: account.role,
    })
}

/// Caller whose account currently has role `admin`
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token_user = AuthUser::from_request_parts(parts, state).await?;
        let user = current_account(state, token_user).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// Caller allowed to publish listings and stories.
///
/// Agents are resolved to their profile here so handlers can scope writes to it.
#[derive(Debug, Clone)]
pub enum Publisher {
    Admin(AuthUser),
    Agent { user: AuthUser, agent: Agent },
}

impl Publisher {
    /// The profile an agent publishes as; `None` for admins
    pub fn agent_id(&self) -> Option<i64> {
        match self {
            Publisher::Admin(_) => None,
            Publisher::Agent { agent, .. } => Some(agent.id),
        }
    }

    /// Admins may touch anything, agents only rows attributed to them
    pub fn ensure_owns(&self, owner: Option<i64>) -> ApiResult<()> {
        match self {
            Publisher::Admin(_) => Ok(()),
            Publisher::Agent { agent, .. } if owner == Some(agent.id) => Ok(()),
            Publisher::Agent { .. } => Err(ApiError::Forbidden(
                "Agents can only modify their own content".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Publisher {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token_user = AuthUser::from_request_parts(parts, state).await?;
        let user = current_account(state, token_user).await?;
        match user.role {
            Role::Admin => Ok(Publisher::Admin(user)),
            Role::Agent => {
                let agent = state
                    .persist
                    .find_agent_by_user(user.id)
                    .await?
                    .ok_or_else(|| ApiError::Forbidden("No agent profile for this account".to_string()))?;
                Ok(Publisher::Agent { user, agent })
            }
            Role::User => Err(ApiError::Forbidden("Agent or admin access required".to_string())),
        }
    }
}
