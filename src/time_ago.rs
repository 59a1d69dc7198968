/// Relative "last accessed" descriptions, measured from the moment of a refresh
use chrono::{DateTime, Datelike, TimeZone, Utc};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const WEEK: f64 = 604_800.0;
const FOUR_WEEKS: f64 = 2_419_200.0;

/// The instant a snapshot pass ran, in milliseconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshTime {
    timestamp: f64,
    month: i64,
    offset_from_first: f64,
}

impl RefreshTime {
    pub fn new(timestamp: f64) -> RefreshTime {
        let date = to_datetime(timestamp);
        let first = Utc
            .with_ymd_and_hms(date.year(), date.month(), 1, 0, 0, 0)
            .single()
            .map_or(timestamp, |first| first.timestamp_millis() as f64);

        RefreshTime {
            timestamp,
            month: month_index(&date),
            offset_from_first: timestamp - first,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Describe how long ago `timestamp` was
    ///
    /// Up to four weeks the buckets are fixed durations. Past that, months are
    /// counted on the calendar, shifting `timestamp` by the refresh instant's
    /// offset into its own month so a partial month never counts as a whole one.
    pub fn time_ago(&self, timestamp: f64) -> String {
        let delta = (self.timestamp - timestamp).trunc() / 1000.0;

        if delta < FOUR_WEEKS {
            return match delta {
                d if d < MINUTE => "less than a minute ago".to_string(),
                d if d < 2.0 * MINUTE => "about a minute ago".to_string(),
                d if d < HOUR => format!("{} minutes ago", (d / MINUTE).trunc()),
                d if d < 2.0 * HOUR => "more than an hour ago".to_string(),
                d if d < DAY => format!("more than {} hours ago", (d / HOUR).trunc()),
                d if d < 2.0 * DAY => "more than a day ago".to_string(),
                d if d < WEEK => format!("more than {} days ago", (d / DAY).trunc()),
                d if d < 2.0 * WEEK => "more than a week ago".to_string(),
                d => format!("more than {} weeks ago", (d / WEEK).trunc()),
            };
        }

        let other = to_datetime(timestamp - self.offset_from_first - 1.0);
        let month_delta = self.month - month_index(&other) - 1;

        match month_delta {
            d if d < 1 => "more than 4 weeks ago".to_string(),
            1 => "more than a month ago".to_string(),
            d if d < 12 => format!("more than {} months ago", d),
            d if d < 24 => "more than a year ago".to_string(),
            d => format!("more than {} years ago", d / 12),
        }
    }
}

fn to_datetime(timestamp: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp as i64).unwrap_or_default()
}

fn month_index(date: &DateTime<Utc>) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
