use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_types::{Category, CategoryDraft, ResourceKey};

use super::{created, done, ok, parse_id, Envelope};
use crate::extract::ApiJson;
use crate::middleware::auth::AdminUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<Vec<Category>>> {
    Ok(ok(state.persist.list_categories().await?))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Envelope<Category>> {
    let category = state
        .persist
        .get_category(&ResourceKey::parse(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &key))?;
    Ok(ok(category))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    ApiJson(draft): ApiJson<CategoryDraft>,
) -> ApiResult<(StatusCode, Envelope<Category>)> {
    draft.validate()?;
    Ok(created(state.persist.create_category(draft).await?))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<CategoryDraft>,
) -> ApiResult<Envelope<Category>> {
    let id = parse_id(&id)?;
    draft.validate()?;

    let category = state
        .persist
        .update_category(id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;
    Ok(ok(category))
}

/// Listings in the category are kept and left uncategorised
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if !state.persist.delete_category(id).await? {
        return Err(ApiError::not_found("Category", id));
    }
    Ok(done("Category deleted"))
}
