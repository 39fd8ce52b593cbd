//! Back-office endpoints; every handler requires an admin token.

use axum::extract::{Path, Query, State};
use chrono::Utc;
use std::sync::Arc;

use guri_types::{PurgeReport, StoreStats, Story, User};

use super::{done, ok, page_from, parse_id, Envelope, QueryPairs};
use crate::middleware::auth::AdminUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub async fn stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<StoreStats>> {
    Ok(ok(state.persist.stats(Utc::now()).await?))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<User>>> {
    let page = page_from(&query)?;
    Ok(ok(state.persist.list_users(page).await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if id == admin.id {
        return Err(ApiError::BadRequest("You cannot delete your own account".to_string()));
    }
    if !state.persist.delete_user(id).await? {
        return Err(ApiError::not_found("User", id));
    }
    tracing::info!(user_id = id, admin_id = admin.id, "user deleted");
    Ok(done("User deleted"))
}

/// Every story, expired ones included
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<Vec<Story>>> {
    Ok(ok(state.persist.list_stories(None).await?))
}

pub async fn purge_expired_stories(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Envelope<PurgeReport>> {
    let purged = state.persist.purge_expired_stories(Utc::now()).await?;
    tracing::info!(purged, "expired stories purged");
    Ok(ok(PurgeReport { purged }))
}
