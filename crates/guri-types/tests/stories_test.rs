use chrono::{DateTime, Duration, TimeZone, Utc};
use guri_types::{group_stories_by_agent, MediaType, Story};
use std::collections::HashSet;

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn story(id: i64, agent_id: i64, created_at: DateTime<Utc>) -> Story {
    Story {
        id,
        agent_id,
        media_type: MediaType::Video,
        media_url: format!("/uploads/story-{}.mp4", id),
        thumbnail_url: None,
        duration: 15,
        created_at,
        expires_at: None,
        agent_name: Some(format!("Agent {}", agent_id)),
        agent_title: Some("Broker".to_string()),
        agent_photo: None,
        agent_phone: Some("+252 61 000 0000".to_string()),
    }
}

#[test]
fn test_grouping_order() {
    let (t1, t2, t3) = (at(0), at(10), at(20));
    let stories = vec![story(1, 1, t1), story(2, 2, t2), story(3, 1, t3)];

    let groups = group_stories_by_agent(&stories);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].agent_id, 1);
    let times: Vec<_> = groups[0].stories.iter().map(|s| s.created_at).collect();
    assert_eq!(times, vec![t3, t1]);
    assert_eq!(groups[1].agent_id, 2);
    assert_eq!(groups[1].stories[0].created_at, t2);
}

#[test]
fn test_grouping_preserves_every_story_once() {
    let stories: Vec<Story> = (0..40)
        .map(|i| story(i, (i * 7) % 5, at((i * 13) % 90)))
        .collect();

    let groups = group_stories_by_agent(&stories);

    let mut seen = HashSet::new();
    for group in &groups {
        assert!(!group.stories.is_empty());
        for s in &group.stories {
            assert_eq!(s.agent_id, group.agent_id);
            assert!(seen.insert(s.id), "story {} appears twice", s.id);
        }
        for pair in group.stories.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
    assert_eq!(seen.len(), stories.len());

    for pair in groups.windows(2) {
        assert!(pair[0].latest_at() >= pair[1].latest_at());
    }
}

#[test]
fn test_grouping_does_not_touch_input() {
    let stories = vec![story(1, 1, at(0)), story(2, 1, at(5))];
    let before = stories.clone();
    let _ = group_stories_by_agent(&stories);
    assert_eq!(stories, before);
}

#[test]
fn test_group_carries_agent_fields() {
    let groups = group_stories_by_agent(&[story(1, 4, at(0))]);
    assert_eq!(groups[0].agent_name.as_deref(), Some("Agent 4"));
    assert_eq!(groups[0].agent_phone.as_deref(), Some("+252 61 000 0000"));
}

#[test]
fn test_story_labels() {
    let s = story(1, 1, at(0));
    let now = at(90);
    assert_eq!(s.posted_label(now), "1 hour ago");
    assert_eq!(s.expiry_label(now), "Expires in 22h 30m");
    assert!(s.is_live(now));
    assert!(!s.is_live(at(24 * 60 + 1)));
}
