//! Time normalization
//!
//! Turns the loose date/time strings a model produces ("2024-06-01",
//! "14:30", "2024-06-01T09:00") into absolute instants resolved in a known
//! IANA time zone.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Invalid time input: {0}")]
    InvalidTimeInput(String),
}

impl TimeError {
    fn invalid(message: impl Into<String>) -> Self {
        TimeError::InvalidTimeInput(message.into())
    }
}

/// Half-open interval `[start, end)` between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeError> {
        if start > end {
            return Err(TimeError::invalid(format!(
                "start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two half-open ranges share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection with `bounds`, or `None` when nothing of positive length remains.
    pub fn clip_to(&self, bounds: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then_some(TimeRange { start, end })
    }
}

/// Resolve a date range with optional times of day into instants in `tz`.
///
/// A missing start time means the start of the day (`00:00:00`), a missing
/// end time means the last second of the day (`23:59:59`).
pub fn normalize_range(
    raw_start: &str,
    raw_end: &str,
    raw_start_time: Option<&str>,
    raw_end_time: Option<&str>,
    tz: Tz,
) -> Result<TimeRange, TimeError> {
    let start_date = parse_date(raw_start)?;
    let end_date = parse_date(raw_end)?;

    let start_time = match non_blank(raw_start_time) {
        Some(raw) => parse_time_of_day(raw)?,
        None => NaiveTime::MIN,
    };
    let end_time = match non_blank(raw_end_time) {
        Some(raw) => parse_time_of_day(raw)?,
        None => end_of_day(),
    };

    let start = resolve_local(start_date.and_time(start_time), tz)?;
    let end = resolve_local(end_date.and_time(end_time), tz)?;
    TimeRange::new(start, end)
}

/// Parse a single instant.
///
/// RFC 3339 strings keep their own offset; naive `YYYY-MM-DDTHH:MM[:SS]`
/// values and bare dates are interpreted in `tz`.
pub fn parse_instant(raw: &str, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return resolve_local(naive, tz);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return resolve_local(date.and_time(NaiveTime::MIN), tz);
    }
    Err(TimeError::invalid(format!("'{raw}' is not a recognizable date or date-time")))
}

/// Widen `[start, end)` to cover every local day in `tz` it touches.
///
/// The result starts at local midnight of the first day and ends at local
/// midnight following the last day. An end exactly on midnight does not
/// pull in the following day.
pub fn local_day_bounds(range: &TimeRange, tz: Tz) -> Result<TimeRange, TimeError> {
    let first_day = range.start.with_timezone(&tz).date_naive();
    let end_local = range.end.with_timezone(&tz);
    let mut last_day = end_local.date_naive();
    if range.end > range.start && end_local.time() == NaiveTime::MIN {
        last_day = last_day.pred_opt().unwrap_or(last_day);
    }
    let after_last = last_day
        .succ_opt()
        .ok_or_else(|| TimeError::invalid("date out of range"))?;

    let start = resolve_local(first_day.and_time(NaiveTime::MIN), tz)?;
    let end = resolve_local(after_last.and_time(NaiveTime::MIN), tz)?;
    TimeRange::new(start, end)
}

/// Parse an IANA zone name such as `Europe/Berlin`.
pub fn parse_zone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::invalid(format!("unknown time zone '{name}'")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TimeError::invalid(format!("'{raw}' is not a date, expected YYYY-MM-DD")))
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, TimeError> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            TimeError::invalid(format!(
                "'{raw}' is not a time of day, expected HH:MM or HH:MM:SS"
            ))
        })
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Map a wall-clock time in `tz` to an instant. Folded times take the
/// earlier instant; times inside a DST gap are rejected.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(TimeError::invalid(format!(
            "{naive} does not exist in time zone {}",
            tz.name()
        ))),
    }
}
