//! # Guri
//!
//! Library side of the Guri real-estate marketplace: listings, agents, developer
//! projects and agent stories.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guri::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = GuriClient::new("http://localhost:8080")?;
//!
//!     let filter = PropertyFilter {
//!         location: Some("Mogadishu".to_string()),
//!         ..Default::default()
//!     };
//!     for property in client.properties(&filter, Page::default()).await? {
//!         println!("{} - {} {}", property.title, property.price, property.currency);
//!     }
//!
//!     for group in client.stories().await? {
//!         println!("{:?}: {} stories", group.agent_name, group.stories.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **guri-types**: domain models, listing filters, story grouping and expiry
//! - **guri-persist**: the `PersistenceClient` seam with MySQL and in-memory stores
//! - **guri-client**: typed HTTP client for the JSON API
//!
//! The HTTP server itself lives in the `guri-api` crate.
//!
//! ## Features
//!
//! - `mysql`: enable the MySQL backend in [`persist`]

pub use guri_client as client;
pub use guri_persist as persist;
pub use guri_types as types;

pub use guri_client::{ClientError, GuriClient, Session};
pub use guri_persist::{MemoryPersistenceClient, PersistClientBuilder, PersistenceClient};
pub use guri_types::{
    group_stories_by_agent, ApiResponse, Page, Property, PropertyFilter, Purpose, Story, StoryGroup,
};

/// Commonly used types
pub mod prelude {
    pub use crate::client::{GuriClient, NewStory, Session, Upload};
    pub use crate::types::{
        days_ago, group_stories_by_agent, is_expired, time_until_expiry, Agent, AgentFilter, Page,
        Project, ProjectFilter, Property, PropertyFilter, PropertyType, Purpose, Story, StoryGroup,
    };
    pub use anyhow::Result;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_prelude_covers_the_story_row() {
        let now = Utc::now();
        let story = |id: i64, agent_id: i64, minutes: i64| -> Story {
            sample_story(id, agent_id, now - Duration::minutes(minutes))
        };

        let groups = group_stories_by_agent(&[story(1, 7, 90), story(2, 8, 5), story(3, 7, 2)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].agent_id, 7);
        assert_eq!(days_ago(groups[0].stories[0].created_at, now), "2 minutes ago");
        assert!(!is_expired(groups[1].stories[0].effective_expiry(), now));
    }

    fn sample_story(id: i64, agent_id: i64, created_at: chrono::DateTime<Utc>) -> Story {
        Story {
            id,
            agent_id,
            media_type: crate::types::MediaType::Image,
            media_url: format!("/uploads/{}.jpg", id),
            thumbnail_url: None,
            duration: 5,
            created_at,
            expires_at: None,
            agent_name: None,
            agent_title: None,
            agent_photo: None,
            agent_phone: None,
        }
    }

    #[tokio::test]
    async fn test_memory_store_reachable_through_facade() {
        let store = crate::MemoryPersistenceClient::new();
        crate::PersistenceClient::ping(&store).await.unwrap();
    }
}
