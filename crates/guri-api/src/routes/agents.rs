use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_persist::NewUser;
use guri_types::{Agent, AgentDraft, AgentFilter, NewAgentAccount, Role};

use super::{created, done, ok, page_from, pairs_of, parse_id, Envelope, QueryPairs};
use crate::auth::hash_password_async;
use crate::extract::{ApiJson, ApiMultipart};
use crate::middleware::auth::{AdminUser, AuthUser};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Highest rated first
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Agent>>> {
    let filter = AgentFilter::from_query_pairs(pairs_of(&query))?;
    let page = page_from(&query)?;

    let agents = state.persist.list_agents(&filter, page).await?;
    Ok(ok(agents))
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Agent>> {
    let id = parse_id(&id)?;
    Ok(ok(existing(&state, id).await?))
}

async fn existing(state: &AppState, id: i64) -> ApiResult<Agent> {
    state
        .persist
        .get_agent(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent", id))
}

/// An admin, or the agent editing their own profile
fn ensure_can_edit(user: &AuthUser, agent: &Agent) -> ApiResult<()> {
    if user.is_admin() || agent.user_id == Some(user.id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Agents can only edit their own profile".to_string()))
    }
}

/// Creates the login and the profile in one unit
#[tracing::instrument(skip(state, account), fields(email = %account.email))]
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    ApiJson(account): ApiJson<NewAgentAccount>,
) -> ApiResult<(StatusCode, Envelope<Agent>)> {
    account.validate()?;

    let login = NewUser {
        name: account.agent.name.trim().to_string(),
        email: account.email.clone(),
        password_hash: hash_password_async(account.password.clone()).await?,
        role: Role::Agent,
    };
    let (user, agent) = state.persist.create_agent_account(login, account.agent).await?;

    tracing::info!(agent_id = agent.id, user_id = user.id, "agent account created");
    Ok(created(agent))
}

pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<AgentDraft>,
) -> ApiResult<Envelope<Agent>> {
    let id = parse_id(&id)?;
    ensure_can_edit(&user, &existing(&state, id).await?)?;
    draft.validate()?;

    let agent = state
        .persist
        .update_agent(id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent", id))?;
    Ok(ok(agent))
}

/// Also removes the agent's login and stories; their listings stay, unassigned
pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if !state.persist.delete_agent(id).await? {
        return Err(ApiError::not_found("Agent", id));
    }
    tracing::info!(agent_id = id, "agent deleted");
    Ok(done("Agent deleted"))
}

/// The first uploaded image becomes the profile photo
pub async fn upload_agent_images(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Envelope<Vec<String>>)> {
    let id = parse_id(&id)?;
    ensure_can_edit(&user, &existing(&state, id).await?)?;

    let urls = state.uploads.save_images(multipart).await?;
    if let Some(photo) = urls.first() {
        let attached = match state.persist.set_agent_photo(id, photo.clone()).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ApiError::not_found("Agent", id)),
            Err(err) => Err(err.into()),
        };
        state.uploads.settle(&urls, attached).await?;
    }
    Ok(created(urls))
}
