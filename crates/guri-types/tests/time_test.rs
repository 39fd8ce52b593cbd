use chrono::{Duration, Utc};
use guri_types::{days_ago, is_expired, time_until_expiry};

#[test]
fn test_days_ago_buckets() {
    let now = Utc::now();
    assert_eq!(days_ago(now - Duration::seconds(30), now), "Just now");
    assert_eq!(days_ago(now - Duration::minutes(5), now), "5 minutes ago");
    assert_eq!(days_ago(now - Duration::hours(2), now), "2 hours ago");
    assert_eq!(days_ago(now - Duration::days(3), now), "3 days ago");
}

#[test]
fn test_is_expired() {
    let now = Utc::now();
    assert!(is_expired(now - Duration::milliseconds(1), now));
    assert!(!is_expired(now + Duration::hours(1), now));
}

#[test]
fn test_time_until_expiry() {
    let now = Utc::now();
    assert_eq!(time_until_expiry(now + Duration::minutes(90), now), "Expires in 1h 30m");
    assert_eq!(time_until_expiry(now - Duration::seconds(1), now), "Expired");
    assert_eq!(time_until_expiry(now + Duration::minutes(45), now), "Expires in 45m");
}
