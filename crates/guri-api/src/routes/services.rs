use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_types::{Service, ServiceDraft};

use super::{created, done, ok, parse_id, Envelope};
use crate::extract::ApiJson;
use crate::middleware::auth::AdminUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub async fn list_services(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<Vec<Service>>> {
    Ok(ok(state.persist.list_services().await?))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Service>> {
    let id = parse_id(&id)?;
    let service = state
        .persist
        .get_service(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", id))?;
    Ok(ok(service))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    ApiJson(draft): ApiJson<ServiceDraft>,
) -> ApiResult<(StatusCode, Envelope<Service>)> {
    draft.validate()?;
    Ok(created(state.persist.create_service(draft).await?))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<ServiceDraft>,
) -> ApiResult<Envelope<Service>> {
    let id = parse_id(&id)?;
    draft.validate()?;

    let service = state
        .persist
        .update_service(id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", id))?;
    Ok(ok(service))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if !state.persist.delete_service(id).await? {
        return Err(ApiError::not_found("Service", id));
    }
    Ok(done("Service deleted"))
}
