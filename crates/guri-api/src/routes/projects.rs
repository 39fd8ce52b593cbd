//! Developer projects. The public site reads them through `/new-projects`; the
//! back office manages them under `/projects`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_types::{Project, ProjectDraft, ProjectFilter, ResourceKey};

use super::{created, done, ok, page_from, pairs_of, parse_id, Envelope, QueryPairs};
use crate::extract::{ApiJson, ApiMultipart};
use crate::middleware::auth::AdminUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

async fn search(state: &AppState, query: &QueryPairs) -> ApiResult<Vec<Project>> {
    let filter = ProjectFilter::from_query_pairs(pairs_of(query))?;
    let page = page_from(query)?;
    Ok(state.persist.list_projects(&filter, page).await?)
}

async fn lookup(state: &AppState, key: &str) -> ApiResult<Project> {
    state
        .persist
        .get_project(&ResourceKey::parse(key))
        .await?
        .ok_or_else(|| ApiError::not_found("Project", key))
}

pub async fn list_new_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Project>>> {
    Ok(ok(search(&state, &query).await?))
}

pub async fn get_new_project(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Envelope<Project>> {
    Ok(ok(lookup(&state, &key).await?))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Project>>> {
    Ok(ok(search(&state, &query).await?))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(key): Path<String>,
) -> ApiResult<Envelope<Project>> {
    Ok(ok(lookup(&state, &key).await?))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> ApiResult<(StatusCode, Envelope<Project>)> {
    draft.validate()?;
    let project = state.persist.create_project(draft).await?;
    tracing::info!(project_id = project.id, slug = %project.slug, "project created");
    Ok(created(project))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> ApiResult<Envelope<Project>> {
    let id = parse_id(&id)?;
    draft.validate()?;

    let project = state
        .persist
        .update_project(id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Project", id))?;
    Ok(ok(project))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if !state.persist.delete_project(id).await? {
        return Err(ApiError::not_found("Project", id));
    }
    Ok(done("Project deleted"))
}

pub async fn upload_project_images(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Envelope<Vec<String>>)> {
    let id = parse_id(&id)?;
    lookup(&state, &id.to_string()).await?;

    let urls = state.uploads.save_images(multipart).await?;
    let attached = match state.persist.add_project_images(id, urls.clone()).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::not_found("Project", id)),
        Err(err) => Err(err.into()),
    };
    state.uploads.settle(&urls, attached).await?;
    Ok(created(urls))
}
