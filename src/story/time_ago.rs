//! Relative "posted N ago" text.

use chrono::{DateTime, Utc};

use crate::carousel::error::{CarouselError, CarouselResult};

/// Format how long ago `posted_at` was, relative to `now`.
///
/// Whole hours win over whole minutes; under a minute is "Just now".
/// A timestamp after `now` is an error and produces no text.
pub fn time_ago(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> CarouselResult<String> {
    if posted_at > now {
        return Err(CarouselError::FutureTimestamp(posted_at));
    }

    let elapsed = now - posted_at;
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    let text = if hours > 0 {
        format!("{hours} hour{} ago", plural(hours))
    } else if minutes > 0 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else {
        "Just now".to_string()
    };
    Ok(text)
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn two_hours() {
        let posted = now() - Duration::hours(2);
        assert_eq!(time_ago(posted, now()).unwrap(), "2 hours ago");
    }

    #[test]
    fn one_hour_singular() {
        let posted = now() - Duration::minutes(119);
        assert_eq!(time_ago(posted, now()).unwrap(), "1 hour ago");
    }

    #[test]
    fn ninety_seconds() {
        let posted = now() - Duration::seconds(90);
        assert_eq!(time_ago(posted, now()).unwrap(), "1 minute ago");
    }

    #[test]
    fn minutes_plural() {
        let posted = now() - Duration::minutes(45);
        assert_eq!(time_ago(posted, now()).unwrap(), "45 minutes ago");
    }

    #[test]
    fn ten_seconds() {
        let posted = now() - Duration::seconds(10);
        assert_eq!(time_ago(posted, now()).unwrap(), "Just now");
    }

    #[test]
    fn same_instant() {
        assert_eq!(time_ago(now(), now()).unwrap(), "Just now");
    }

    #[test]
    fn days_stay_in_hours() {
        let posted = now() - Duration::days(3);
        assert_eq!(time_ago(posted, now()).unwrap(), "72 hours ago");
    }

    #[test]
    fn future_is_error() {
        let posted = now() + Duration::seconds(1);
        assert_eq!(
            time_ago(posted, now()),
            Err(CarouselError::FutureTimestamp(posted))
        );
    }
}
