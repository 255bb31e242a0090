use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use futures::{Stream, stream};

pub const EXPIRED: &str = "Expired";

/// Recompute cadence for list rows.
pub const LIST_CADENCE: Duration = Duration::from_secs(60);
/// Recompute cadence for detail-page countdowns.
pub const DETAIL_CADENCE: Duration = Duration::from_secs(1);

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Expired,
}

impl TimeLeft {
    /// Floors every component; anything at or past `end_time` is expired.
    pub fn between(end_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let millis = (end_time - now).num_milliseconds();
        if millis <= 0 {
            return TimeLeft::Expired;
        }

        let total = millis / 1000;
        TimeLeft::Remaining {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / 60,
            seconds: total % 60,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TimeLeft::Expired)
    }

    /// Detail-page rendering, e.g. `"1d 02h 03m 04s"`.
    pub fn countdown(&self) -> String {
        match self {
            TimeLeft::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => format!("{days}d {hours:02}h {minutes:02}m {seconds:02}s"),
            TimeLeft::Expired => EXPIRED.to_string(),
        }
    }
}

/// List rendering: `"Xd Yh"` or `"Expired"`.
impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLeft::Remaining { days, hours, .. } => write!(f, "{days}d {hours}h"),
            TimeLeft::Expired => f.write_str(EXPIRED),
        }
    }
}

pub fn format_time_left(end_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    TimeLeft::between(end_time, now).to_string()
}

/// Re-evaluates the time left every `cadence` until it reaches `Expired` (yielded once).
/// Dropping the stream stops the timer.
pub fn countdown(end_time: DateTime<Utc>, cadence: Duration) -> impl Stream<Item = TimeLeft> {
    let interval = tokio::time::interval(cadence);

    stream::unfold((interval, false), move |(mut interval, done)| async move {
        if done {
            return None;
        }
        interval.tick().await;
        let left = TimeLeft::between(end_time, Utc::now());
        Some((left, (interval, left.is_expired())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use futures::StreamExt;

    #[test]
    fn just_past_end_is_expired() {
        let now = Utc::now();
        let end = now - ChronoDuration::milliseconds(1);
        assert_eq!(format_time_left(end, now), "Expired");
        assert_eq!(format_time_left(now, now), "Expired");
    }

    #[test]
    fn days_and_hours_are_floored() {
        let now = Utc::now();
        let end = now + ChronoDuration::days(1) + ChronoDuration::hours(2);
        assert_eq!(format_time_left(end, now), "1d 2h");

        let almost = now + ChronoDuration::days(1) + ChronoDuration::hours(2)
            - ChronoDuration::seconds(1);
        assert_eq!(format_time_left(almost, now), "1d 1h");
    }

    #[test]
    fn countdown_format_includes_minutes_and_seconds() {
        let now = Utc::now();
        let end = now
            + ChronoDuration::days(2)
            + ChronoDuration::hours(3)
            + ChronoDuration::minutes(4)
            + ChronoDuration::seconds(5);
        assert_eq!(TimeLeft::between(end, now).countdown(), "2d 03h 04m 05s");
    }

    #[tokio::test]
    async fn countdown_stream_ends_after_expiry() {
        let end = Utc::now() - ChronoDuration::seconds(5);
        let ticks: Vec<TimeLeft> = countdown(end, Duration::from_millis(5)).collect().await;
        assert_eq!(ticks, vec![TimeLeft::Expired]);
    }
}
