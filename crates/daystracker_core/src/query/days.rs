use crate::calendar::days_between;
use crate::model::event::{Event, RecordId};
use chrono::{DateTime, TimeZone, Utc};

/// Days from the newest record to `now`.
///
/// Returns `None` when the event has no records. A record dated after `now`
/// yields a negative count; callers decide whether to clamp.
pub fn days_since_latest<Tz: TimeZone>(event: &Event, now: DateTime<Utc>, tz: &Tz) -> Option<i64> {
    event
        .latest_record()
        .map(|latest| days_between(latest.date, now, tz))
}

/// Days between `record_id` and its chronological predecessor.
///
/// Uses the `sorted_records` order, so the predecessor is the next entry in
/// the newest-first list. The oldest record yields `Some(0)`. Returns `None`
/// when `record_id` is not owned by `event`.
pub fn days_from_previous<Tz: TimeZone>(event: &Event, record_id: RecordId, tz: &Tz) -> Option<i64> {
    let sorted = event.sorted_records();
    let position = sorted.iter().position(|record| record.id == record_id)?;
    let delta = sorted
        .get(position + 1)
        .map_or(0, |previous| days_between(previous.date, sorted[position].date, tz));
    Some(delta)
}
