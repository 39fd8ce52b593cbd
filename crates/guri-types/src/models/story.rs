use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{require, ValidationError};
use crate::time::{self, STORY_TTL_HOURS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Classify an upload by its MIME type (`image/*` or `video/*`)
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let major = content_type.split('/').next()?.trim().to_ascii_lowercase();
        match major.as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(ValidationError::new("media_type", format!("unknown media type '{}'", other))),
        }
    }
}

/// Short-lived media post attributed to an agent.
///
/// The `agent_*` fields are joined from the owning agent when the story is read,
/// so a stories row can render without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub agent_id: i64,
    pub media_type: MediaType,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Display duration in seconds
    pub duration: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_phone: Option<String>,
}

impl Story {
    /// Stored expiry, or 24 hours after creation for rows written without one
    pub fn effective_expiry(&self) -> DateTime<Utc> {
        self.expires_at
            .unwrap_or_else(|| self.created_at + Duration::hours(STORY_TTL_HOURS))
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !time::is_expired(self.effective_expiry(), now)
    }

    pub fn posted_label(&self, now: DateTime<Utc>) -> String {
        time::days_ago(self.created_at, now)
    }

    pub fn expiry_label(&self, now: DateTime<Utc>) -> String {
        time::time_until_expiry(self.effective_expiry(), now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub agent_id: i64,
    pub media_type: MediaType,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_duration() -> u32 {
    5
}

impl StoryDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("media_url", &self.media_url)?;
        if self.duration == 0 || self.duration > 60 {
            return Err(ValidationError::new("duration", "must be between 1 and 60 seconds"));
        }
        Ok(())
    }
}

/// Fields an owner may change after posting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl StoryUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.duration, Some(d) if d == 0 || d > 60) {
            return Err(ValidationError::new("duration", "must be between 1 and 60 seconds"));
        }
        Ok(())
    }
}
