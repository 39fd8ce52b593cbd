use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Story;

/// One agent's stories for the stories row, newest first.
///
/// Not persisted; rebuilt from the flat story list on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryGroup {
    pub agent_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_phone: Option<String>,
    pub stories: Vec<Story>,
}

impl StoryGroup {
    fn seeded_from(story: &Story) -> Self {
        Self {
            agent_id: story.agent_id,
            agent_name: story.agent_name.clone(),
            agent_title: story.agent_title.clone(),
            agent_photo: story.agent_photo.clone(),
            agent_phone: story.agent_phone.clone(),
            stories: Vec::new(),
        }
    }

    /// Creation time of the newest story in the group
    pub fn latest_at(&self) -> Option<DateTime<Utc>> {
        self.stories.first().map(|s| s.created_at)
    }
}

/// Group a flat list of stories by owning agent.
///
/// The first story seen for an agent seeds the group's display fields. Stories are
/// sorted newest first inside each group, and groups are ordered by their newest
/// story. Both sorts are stable, so equal timestamps keep input order.
pub fn group_stories_by_agent(stories: &[Story]) -> Vec<StoryGroup> {
    let mut groups: Vec<StoryGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for story in stories {
        let slot = *index.entry(story.agent_id).or_insert_with(|| {
            groups.push(StoryGroup::seeded_from(story));
            groups.len() - 1
        });
        groups[slot].stories.push(story.clone());
    }

    for group in &mut groups {
        group.stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    groups.sort_by(|a, b| b.latest_at().cmp(&a.latest_at()));

    groups
}

/// Drop stories whose effective expiry is before `now`
pub fn filter_live(stories: Vec<Story>, now: DateTime<Utc>) -> Vec<Story> {
    stories.into_iter().filter(|s| s.is_live(now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::Duration;

    fn story(id: i64, agent_id: i64, created_at: DateTime<Utc>) -> Story {
        Story {
            id,
            agent_id,
            media_type: MediaType::Image,
            media_url: format!("/uploads/{}.jpg", id),
            thumbnail_url: None,
            duration: 5,
            created_at,
            expires_at: None,
            agent_name: Some(format!("Agent {}", agent_id)),
            agent_title: None,
            agent_photo: None,
            agent_phone: None,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_stories_by_agent(&[]).is_empty());
    }

    #[test]
    fn test_single_story() {
        let now = Utc::now();
        let groups = group_stories_by_agent(&[story(1, 7, now)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].agent_id, 7);
        assert_eq!(groups[0].stories.len(), 1);
    }

    #[test]
    fn test_first_seen_story_seeds_metadata() {
        let now = Utc::now();
        let mut older = story(1, 3, now - Duration::hours(2));
        older.agent_name = Some("Old Name".to_string());
        let mut newer = story(2, 3, now);
        newer.agent_name = Some("New Name".to_string());

        let groups = group_stories_by_agent(&[older, newer]);
        assert_eq!(groups[0].agent_name.as_deref(), Some("Old Name"));
        assert_eq!(groups[0].stories[0].id, 2);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let now = Utc::now();
        let groups = group_stories_by_agent(&[story(1, 5, now), story(2, 6, now), story(3, 5, now)]);
        assert_eq!(groups[0].agent_id, 5);
        assert_eq!(groups[1].agent_id, 6);
        let ids: Vec<i64> = groups[0].stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_filter_live() {
        let now = Utc::now();
        let fresh = story(1, 1, now - Duration::hours(1));
        let stale = story(2, 1, now - Duration::hours(25));
        let mut extended = story(3, 1, now - Duration::hours(30));
        extended.expires_at = Some(now + Duration::hours(1));

        let live = filter_live(vec![fresh, stale, extended], now);
        let ids: Vec<i64> = live.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
