use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_types::{Contact, ContactDraft, ContactUpdate};

use super::{created, done, ok, page_from, parse_id, Envelope, QueryPairs};
use crate::extract::ApiJson;
use crate::middleware::auth::AdminUser;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Public contact form
#[tracing::instrument(skip(state, draft), fields(property_id = ?draft.property_id))]
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    ApiJson(draft): ApiJson<ContactDraft>,
) -> ApiResult<(StatusCode, Envelope<Contact>)> {
    draft.validate()?;
    let contact = state.persist.create_contact(draft).await?;
    tracing::info!(contact_id = contact.id, "contact received");
    Ok(created(contact))
}

/// Newest first
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Contact>>> {
    let page = page_from(&query)?;
    Ok(ok(state.persist.list_contacts(page).await?))
}

pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Contact>> {
    let id = parse_id(&id)?;
    let contact = state
        .persist
        .get_contact(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact", id))?;
    Ok(ok(contact))
}

pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ContactUpdate>,
) -> ApiResult<Envelope<Contact>> {
    let id = parse_id(&id)?;
    let contact = state
        .persist
        .set_contact_status(id, update.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact", id))?;
    Ok(ok(contact))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    if !state.persist.delete_contact(id).await? {
        return Err(ApiError::not_found("Contact", id));
    }
    Ok(done("Contact deleted"))
}
