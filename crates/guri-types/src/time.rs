//! Relative-time labels for stories.
//!
//! Every function takes `now` explicitly so callers (and tests) decide the clock.

use chrono::{DateTime, Utc};

/// Stories disappear from the public feed this long after they are posted
pub const STORY_TTL_HOURS: i64 = 24;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

fn unit(count: i64, singular: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}s", count, singular)
    }
}

/// "Just now", "N minutes ago", "N hours ago" or "N days ago".
///
/// Buckets are floored from the millisecond difference, so exactly 60 minutes
/// reads "1 hour ago". Timestamps in the future read "Just now".
pub fn days_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - timestamp).num_milliseconds();

    if diff_ms < MINUTE_MS {
        return "Just now".to_string();
    }
    if diff_ms < HOUR_MS {
        return format!("{} ago", unit(diff_ms / MINUTE_MS, "minute"));
    }
    if diff_ms < DAY_MS {
        return format!("{} ago", unit(diff_ms / HOUR_MS, "hour"));
    }
    format!("{} ago", unit(diff_ms / DAY_MS, "day"))
}

/// True iff `expires_at` is strictly before `now`
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at < now
}

/// "Expired", "Expires in Hh Mm" or "Expires in Mm"
pub fn time_until_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining_ms = (expires_at - now).num_milliseconds();
    if remaining_ms <= 0 {
        return "Expired".to_string();
    }

    let hours = remaining_ms / HOUR_MS;
    let minutes = (remaining_ms % HOUR_MS) / MINUTE_MS;

    if hours >= 1 {
        format!("Expires in {}h {}m", hours, minutes)
    } else {
        format!("Expires in {}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_singular_units() {
        let now = Utc::now();
        assert_eq!(days_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(days_ago(now - Duration::days(1), now), "1 day ago");
    }

    #[test]
    fn test_hour_boundary_uses_milliseconds() {
        let now = Utc::now();
        assert_eq!(days_ago(now - Duration::minutes(60), now), "1 hour ago");
        assert_eq!(
            days_ago(now - Duration::minutes(59) - Duration::seconds(59), now),
            "59 minutes ago"
        );
    }

    #[test]
    fn test_future_timestamp() {
        let now = Utc::now();
        assert_eq!(days_ago(now + Duration::hours(3), now), "Just now");
    }

    #[test]
    fn test_expiry_exact_instant() {
        let now = Utc::now();
        assert!(!is_expired(now, now));
        assert_eq!(time_until_expiry(now, now), "Expired");
    }
}
