//! Calendar-day arithmetic used by every day-count in core.
//!
//! # Responsibility
//! - Convert instants into local calendar days before differencing.
//! - Provide the "now" seam (`Clock`) used by day-since queries.
//!
//! # Invariants
//! - Day counts are differences of calendar dates, never elapsed hours / 24.
//! - Every function takes the time zone explicitly; callers pass
//!   `chrono::Local` in production and a pinned zone in tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

const DAY_LABEL_FORMAT: &str = "%Y/%m/%d";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Returns the calendar date `instant` falls on in `tz`.
pub fn calendar_day<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Returns the first instant of the local calendar day containing `instant`.
///
/// When local midnight is skipped by a DST transition, the first valid
/// whole hour of that day is used instead.
pub fn start_of_day<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let day = calendar_day(instant, tz);
    (0..24)
        .find_map(|hour| {
            let local = day.and_hms_opt(hour, 0, 0)?;
            tz.from_local_datetime(&local).earliest()
        })
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or(instant)
}

/// Whole calendar days from `start` to `end` in `tz`.
///
/// Two instants on the same local day yield `0` whatever their time of day.
/// The result is negative when `end` falls on an earlier day than `start`.
pub fn days_between<Tz: TimeZone>(start: DateTime<Utc>, end: DateTime<Utc>, tz: &Tz) -> i64 {
    (calendar_day(end, tz) - calendar_day(start, tz)).num_days()
}

/// Returns whether `date` and `reference_now` fall on the same local day.
pub fn is_same_calendar_day<Tz: TimeZone>(
    date: DateTime<Utc>,
    reference_now: DateTime<Utc>,
    tz: &Tz,
) -> bool {
    calendar_day(date, tz) == calendar_day(reference_now, tz)
}

/// Formats the local calendar day of `instant` as `yyyy/MM/dd`.
pub fn format_day_label<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    calendar_day(instant, tz).format(DAY_LABEL_FORMAT).to_string()
}
