use reqwest::multipart::Form;
use reqwest::Method;

use guri_types::{Story, StoryGroup, StoryUpdate};

use super::Upload;
use crate::client::GuriClient;
use crate::error::Result;

/// Multipart body of a story upload
#[derive(Debug, Clone)]
pub struct NewStory {
    /// Sent as the `media` field; an image or a video
    pub media: Upload,
    /// Only honoured for admins; agents always post as themselves
    pub agent_id: Option<i64>,
    pub duration: Option<u32>,
    pub thumbnail_url: Option<String>,
}

impl NewStory {
    pub fn new(media: Upload) -> Self {
        Self {
            media,
            agent_id: None,
            duration: None,
            thumbnail_url: None,
        }
    }

    fn into_form(self) -> Result<Form> {
        let mut form = Form::new().part("media", self.media.into_part()?);
        if let Some(agent_id) = self.agent_id {
            form = form.text("agent_id", agent_id.to_string());
        }
        if let Some(duration) = self.duration {
            form = form.text("duration", duration.to_string());
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            form = form.text("thumbnail_url", thumbnail_url);
        }
        Ok(form)
    }
}

impl GuriClient {
    /// Live stories grouped per agent, most recently active agent first
    pub async fn stories(&self) -> Result<Vec<StoryGroup>> {
        let builder = self.request(Method::GET, "/stories").await;
        self.send(builder).await
    }

    /// One agent's live stories, newest first
    pub async fn agent_stories(&self, agent_id: i64) -> Result<Vec<Story>> {
        let builder = self
            .request(Method::GET, &format!("/stories/agent/{}", agent_id))
            .await;
        self.send(builder).await
    }

    pub async fn story(&self, id: i64) -> Result<Story> {
        let builder = self.request(Method::GET, &format!("/stories/{}", id)).await;
        self.send(builder).await
    }

    pub async fn post_story(&self, story: NewStory) -> Result<Story> {
        let builder = self
            .authed(Method::POST, "/stories")
            .await?
            .multipart(story.into_form()?);
        self.send(builder).await
    }

    pub async fn update_story(&self, id: i64, update: &StoryUpdate) -> Result<Story> {
        let builder = self
            .authed(Method::PUT, &format!("/stories/{}", id))
            .await?
            .json(update);
        self.send(builder).await
    }

    pub async fn delete_story(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/stories/{}", id)).await?;
        self.send_empty(builder).await
    }
}
