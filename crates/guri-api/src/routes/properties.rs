use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use guri_types::{Property, PropertyDraft, PropertyFilter, ResourceKey};

use super::{created, done, ok, page_from, pairs_of, param, parse_id, Envelope, QueryPairs};
use crate::extract::{ApiJson, ApiMultipart};
use crate::middleware::auth::Publisher;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const FEATURED_DEFAULT: u32 = 6;
const FEATURED_MAX: u32 = 24;

/// Filtered listing search
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Property>>> {
    let filter = PropertyFilter::from_query_pairs(pairs_of(&query))?;
    let page = page_from(&query)?;

    let properties = state.persist.list_properties(&filter, page).await?;
    Ok(ok(properties))
}

/// Featured listings for the home page; only listings with an agent qualify
pub async fn featured_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Envelope<Vec<Property>>> {
    let limit = param(&query, "limit")?
        .unwrap_or(FEATURED_DEFAULT)
        .clamp(1, FEATURED_MAX);

    let properties = state.persist.featured_properties(limit).await?;
    Ok(ok(properties))
}

/// By id or slug
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Envelope<Property>> {
    let property = state
        .persist
        .get_property(&ResourceKey::parse(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Property", &key))?;
    Ok(ok(property))
}

async fn existing(state: &AppState, id: i64) -> ApiResult<Property> {
    state
        .persist
        .get_property(&ResourceKey::Id(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))
}

/// Agents always list under their own profile
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    ApiJson(mut draft): ApiJson<PropertyDraft>,
) -> ApiResult<(StatusCode, Envelope<Property>)> {
    if let Some(agent_id) = publisher.agent_id() {
        draft.agent_id = Some(agent_id);
    }
    draft.validate()?;

    let property = state.persist.create_property(draft).await?;
    tracing::info!(property_id = property.id, slug = %property.slug, "property created");
    Ok(created(property))
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    Path(id): Path<String>,
    ApiJson(mut draft): ApiJson<PropertyDraft>,
) -> ApiResult<Envelope<Property>> {
    let id = parse_id(&id)?;
    publisher.ensure_owns(existing(&state, id).await?.agent_id)?;
    if let Some(agent_id) = publisher.agent_id() {
        draft.agent_id = Some(agent_id);
    }
    draft.validate()?;

    let property = state
        .persist
        .update_property(id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))?;
    Ok(ok(property))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    publisher.ensure_owns(existing(&state, id).await?.agent_id)?;

    if !state.persist.delete_property(id).await? {
        return Err(ApiError::not_found("Property", id));
    }
    tracing::info!(property_id = id, "property deleted");
    Ok(done("Property deleted"))
}

/// Multipart `images` upload appended to the gallery; returns the new URLs
pub async fn upload_property_images(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Envelope<Vec<String>>)> {
    let id = parse_id(&id)?;
    publisher.ensure_owns(existing(&state, id).await?.agent_id)?;

    let urls = state.uploads.save_images(multipart).await?;
    let attached = match state.persist.add_property_images(id, urls.clone()).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::not_found("Property", id)),
        Err(err) => Err(err.into()),
    };
    state.uploads.settle(&urls, attached).await?;
    Ok(created(urls))
}
