//! Agent stories: public reads of live stories, multipart posting for agents
//! and admins.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;

use guri_types::{group_stories_by_agent, Story, StoryDraft, StoryGroup, StoryUpdate};

use super::{created, done, ok, parse_id, Envelope};
use crate::extract::{ApiJson, ApiMultipart};
use crate::middleware::auth::Publisher;
use crate::uploads::Accept;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_DURATION_SECS: u32 = 5;

/// Live stories grouped per agent, most recent group first
pub async fn list_stories(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<Vec<StoryGroup>>> {
    let stories = state.persist.list_stories(Some(Utc::now())).await?;
    Ok(ok(group_stories_by_agent(&stories)))
}

pub async fn agent_stories(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> ApiResult<Envelope<Vec<Story>>> {
    let agent_id = parse_id(&agent_id)?;
    if state.persist.get_agent(agent_id).await?.is_none() {
        return Err(ApiError::not_found("Agent", agent_id));
    }
    let stories = state
        .persist
        .list_agent_stories(agent_id, Some(Utc::now()))
        .await?;
    Ok(ok(stories))
}

/// Expired stories read as missing
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Story>> {
    let id = parse_id(&id)?;
    let story = state
        .persist
        .get_story(id)
        .await?
        .filter(|s| s.is_live(Utc::now()))
        .ok_or_else(|| ApiError::not_found("Story", id))?;
    Ok(ok(story))
}

/// Parts of a story upload, gathered before anything touches disk
#[derive(Default)]
struct StoryForm {
    media: Option<(String, Vec<u8>)>,
    agent_id: Option<i64>,
    duration: Option<u32>,
    thumbnail_url: Option<String>,
}

async fn read_story_form(mut multipart: Multipart) -> ApiResult<StoryForm> {
    let mut form = StoryForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "media" => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("media part has no content type".to_string()))?;
                form.media = Some((content_type, field.bytes().await?.to_vec()));
            }
            "agent_id" => {
                form.agent_id = Some(parse_id(&field.text().await?)?);
            }
            "duration" => {
                let raw = field.text().await?;
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    let secs = trimmed
                        .parse()
                        .map_err(|_| ApiError::BadRequest(format!("invalid duration: {}", raw)))?;
                    form.duration = Some(secs);
                }
            }
            "thumbnail_url" => {
                let raw = field.text().await?;
                form.thumbnail_url = Some(raw.trim().to_string()).filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Agents always post as themselves; admins name the agent
#[tracing::instrument(skip(state, publisher, multipart), fields(publisher_agent = ?publisher.agent_id()))]
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    ApiMultipart(multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Envelope<Story>)> {
    let form = read_story_form(multipart).await?;

    let agent_id = match publisher.agent_id() {
        Some(own) => own,
        None => form
            .agent_id
            .ok_or_else(|| ApiError::BadRequest("agent_id is required".to_string()))?,
    };
    if state.persist.get_agent(agent_id).await?.is_none() {
        return Err(ApiError::not_found("Agent", agent_id));
    }

    let (content_type, bytes) = form
        .media
        .ok_or_else(|| ApiError::BadRequest("no file in field 'media'".to_string()))?;
    let file = state
        .uploads
        .prepare(&content_type, &bytes, Accept::ImagesAndVideo)?;
    let media_type = file
        .media_type()
        .ok_or_else(|| ApiError::UnsupportedMedia(file.content_type.clone()))?;

    let draft = StoryDraft {
        agent_id,
        media_type,
        media_url: file.url.clone(),
        thumbnail_url: form.thumbnail_url,
        duration: form.duration.unwrap_or(DEFAULT_DURATION_SECS),
    };
    draft.validate()?;

    state.uploads.commit(&file, &bytes).await?;
    let posted = state
        .persist
        .create_story(draft, Utc::now())
        .await
        .map_err(ApiError::from);
    let story = state.uploads.settle(&[file.url], posted).await?;
    tracing::info!(story_id = story.id, agent_id, media_type = %story.media_type, "story posted");
    Ok(created(story))
}

async fn owned_story(state: &AppState, publisher: &Publisher, id: i64) -> ApiResult<Story> {
    let story = state
        .persist
        .get_story(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Story", id))?;
    publisher.ensure_owns(Some(story.agent_id))?;
    Ok(story)
}

pub async fn update_story(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StoryUpdate>,
) -> ApiResult<Envelope<Story>> {
    let id = parse_id(&id)?;
    update.validate()?;
    owned_story(&state, &publisher, id).await?;

    let story = state
        .persist
        .update_story(id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Story", id))?;
    Ok(ok(story))
}

pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    publisher: Publisher,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    let id = parse_id(&id)?;
    owned_story(&state, &publisher, id).await?;

    if !state.persist.delete_story(id).await? {
        return Err(ApiError::not_found("Story", id));
    }
    Ok(done("Story deleted"))
}
