use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One occurrence of an event, as unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DateRange {
    pub start: i64,
    /// Missing upstream `end` means a single point in time.
    #[serde(default)]
    pub end: Option<i64>,
}

impl DateRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    fn end_or_start(&self) -> i64 {
        self.end.unwrap_or(self.start)
    }
}

/// Render the occurrences that have not started yet, one per line, as
/// `С {start} по {end}` in the given time zone.
///
/// An occurrence starting exactly at `now` is kept. Timestamps chrono cannot
/// represent are dropped. Returns an empty string when nothing survives.
pub fn render_date_ranges<Tz>(dates: &[DateRange], now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let now = now.timestamp();
    dates
        .iter()
        .filter(|range| range.start >= now)
        .filter_map(|range| {
            let start = tz.timestamp_opt(range.start, 0).single()?;
            let end = tz.timestamp_opt(range.end_or_start(), 0).single()?;
            Some(format!(
                "С {} по {}",
                start.format(DATETIME_FORMAT),
                end.format(DATETIME_FORMAT)
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
