use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{Story, StoryDraft, StoryUpdate};

use super::{newest_first, MemoryPersistenceClient, Tables};
use crate::error::Result;
use crate::trait_client::StoryRepository;

impl Tables {
    /// LEFT JOIN agents: copy the owner's display fields onto the story
    fn with_agent(&self, story: &Story) -> Story {
        let mut joined = story.clone();
        if let Some(agent) = self.agents.get(&story.agent_id) {
            joined.agent_name = Some(agent.name.clone());
            joined.agent_title = agent.title.clone();
            joined.agent_photo = agent.photo_url().map(str::to_string);
            joined.agent_phone = agent.phone.clone();
        }
        joined
    }

    fn stories_where(
        &self,
        keep: impl Fn(&Story) -> bool,
        live_at: Option<DateTime<Utc>>,
    ) -> Vec<Story> {
        let mut rows: Vec<Story> = self
            .stories
            .values()
            .filter(|s| keep(*s) && live_at.map_or(true, |now| s.is_live(now)))
            .map(|s| self.with_agent(s))
            .collect();
        newest_first(&mut rows, |s| (s.created_at, s.id));
        rows
    }
}

#[async_trait]
impl StoryRepository for MemoryPersistenceClient {
    async fn list_stories(&self, live_at: Option<DateTime<Utc>>) -> Result<Vec<Story>> {
        let t = self.tables.read().await;
        Ok(t.stories_where(|_| true, live_at))
    }

    async fn list_agent_stories(
        &self,
        agent_id: i64,
        live_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Story>> {
        let t = self.tables.read().await;
        Ok(t.stories_where(|s| s.agent_id == agent_id, live_at))
    }

    async fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let t = self.tables.read().await;
        Ok(t.stories.get(&id).map(|s| t.with_agent(s)))
    }

    async fn create_story(&self, draft: StoryDraft, created_at: DateTime<Utc>) -> Result<Story> {
        let mut t = self.tables.write().await;
        t.require_agent("story", Some(draft.agent_id))?;

        let id = t.allocate("stories");
        let story = Story {
            id,
            agent_id: draft.agent_id,
            media_type: draft.media_type,
            media_url: draft.media_url,
            thumbnail_url: draft.thumbnail_url,
            duration: draft.duration,
            created_at,
            expires_at: Some(created_at + self.story_ttl),
            agent_name: None,
            agent_title: None,
            agent_photo: None,
            agent_phone: None,
        };
        t.stories.insert(id, story.clone());
        Ok(t.with_agent(&story))
    }

    async fn update_story(&self, id: i64, update: StoryUpdate) -> Result<Option<Story>> {
        let mut t = self.tables.write().await;
        let Some(story) = t.stories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(thumbnail_url) = update.thumbnail_url {
            story.thumbnail_url = Some(thumbnail_url);
        }
        if let Some(duration) = update.duration {
            story.duration = duration;
        }
        let story = story.clone();
        Ok(Some(t.with_agent(&story)))
    }

    async fn delete_story(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t.stories.remove(&id).is_some())
    }

    async fn purge_expired_stories(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut t = self.tables.write().await;
        let before = t.stories.len();
        t.stories.retain(|_, s| s.is_live(now));
        Ok((before - t.stories.len()) as u64)
    }
}
