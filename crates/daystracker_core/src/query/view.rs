//! Search filtering and display rows for the event list.

use super::days::days_since_latest;
use crate::calendar::{days_between, format_day_label};
use crate::model::event::{Event, EventId, EventRecord};
use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use regex::{Regex, RegexBuilder};

const SEARCH_PATTERN_SIZE_LIMIT: usize = 64 * 1024;

/// One record as shown in an expanded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub record: EventRecord,
    /// `yyyy/MM/dd` in the display time zone.
    pub date_label: String,
    pub days_from_previous: i64,
}

/// One event as shown in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub is_expanded: bool,
    /// `None` until the first record is added.
    pub days_since_latest: Option<i64>,
    /// Newest first.
    pub records: Vec<RecordRow>,
}

/// Events whose title contains `search_text`, ignoring case.
///
/// Only an empty search text returns every event; whitespace is matched like
/// any other character. Order is preserved.
pub fn filtered_events<'a>(events: &'a [Event], search_text: &str) -> Vec<&'a Event> {
    if search_text.is_empty() {
        return events.iter().collect();
    }

    match title_matcher(search_text) {
        Some(matcher) => events
            .iter()
            .filter(|event| matcher.is_match(&event.title))
            .collect(),
        None => Vec::new(),
    }
}

/// Literal, case-insensitive matcher for `search_text`.
///
/// Returns `None` when the pattern compiles past `SEARCH_PATTERN_SIZE_LIMIT`.
fn title_matcher(search_text: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(search_text))
        .case_insensitive(true)
        .size_limit(SEARCH_PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|_| {
            warn!(
                "event=search_filter module=query status=error reason=pattern_too_large chars={}",
                search_text.chars().count()
            );
        })
        .ok()
}

/// Sorted records of `event` paired with their labels and day deltas.
pub fn record_rows<Tz: TimeZone>(event: &Event, tz: &Tz) -> Vec<RecordRow> {
    let sorted = event.sorted_records();
    sorted
        .iter()
        .enumerate()
        .map(|(position, record)| RecordRow {
            record: (*record).clone(),
            date_label: format_day_label(record.date, tz),
            days_from_previous: sorted
                .get(position + 1)
                .map_or(0, |previous| days_between(previous.date, record.date, tz)),
        })
        .collect()
}

/// Full list projection: filter, then compute every day count.
pub fn event_views<Tz: TimeZone>(
    events: &[Event],
    search_text: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<EventView> {
    filtered_events(events, search_text)
        .into_iter()
        .map(|event| EventView {
            id: event.id,
            title: event.title.clone(),
            is_expanded: event.is_expanded,
            days_since_latest: days_since_latest(event, now, tz),
            records: record_rows(event, tz),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{event_views, filtered_events, record_rows, title_matcher};
    use crate::model::event::{Event, EventRecord};
    use chrono::{TimeZone, Utc};

    fn events() -> Vec<Event> {
        ["Running", "Dentist", "Long run (trail)", "Ärztin"]
            .into_iter()
            .map(|title| Event::new(title).unwrap())
            .collect()
    }

    fn titles(events: &[&Event]) -> Vec<String> {
        events.iter().map(|event| event.title.clone()).collect()
    }

    #[test]
    fn only_empty_search_returns_everything_in_order() {
        let all = events();
        assert_eq!(
            titles(&filtered_events(&all, "")),
            vec!["Running", "Dentist", "Long run (trail)", "Ärztin"]
        );
        assert_eq!(titles(&filtered_events(&all, " ")), vec!["Long run (trail)"]);
        assert!(filtered_events(&all, "   ").is_empty());
    }

    #[test]
    fn whitespace_in_search_text_is_significant() {
        let all = events();
        assert!(filtered_events(&all, "run ").is_empty());
        assert_eq!(titles(&filtered_events(&all, " run")), vec!["Long run (trail)"]);
        assert_eq!(titles(&filtered_events(&all, "long run ")), vec!["Long run (trail)"]);
    }

    #[test]
    fn oversized_search_text_is_rejected_by_matcher() {
        let all = events();
        let huge = "a".repeat(100_000);
        assert!(title_matcher(&huge).is_none());
        assert!(filtered_events(&all, &huge).is_empty());
        assert!(title_matcher("run").is_some());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let all = events();
        assert_eq!(
            titles(&filtered_events(&all, "RUN")),
            vec!["Running", "Long run (trail)"]
        );
        assert_eq!(titles(&filtered_events(&all, "ärzt")), vec!["Ärztin"]);
        assert!(filtered_events(&all, "swim").is_empty());
    }

    #[test]
    fn search_text_is_matched_literally() {
        let all = events();
        assert_eq!(titles(&filtered_events(&all, "(trail)")), vec!["Long run (trail)"]);
        assert!(filtered_events(&all, ".*").is_empty());
    }

    #[test]
    fn views_carry_day_counts_and_labels() {
        let mut running = Event::new("Running").unwrap();
        running.is_expanded = true;
        running.records.push(EventRecord::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            "",
        ));
        running.records.push(EventRecord::new(
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            "tempo",
        ));
        let all = vec![running, Event::new("Dentist").unwrap()];
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap();

        let views = event_views(&all, "", now, &Utc);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].days_since_latest, Some(5));
        assert!(views[0].is_expanded);
        assert_eq!(views[1].days_since_latest, None);
        assert!(views[1].records.is_empty());

        let rows = record_rows(&all[0], &Utc);
        assert_eq!(rows[0].date_label, "2024/01/10");
        assert_eq!(rows[0].days_from_previous, 9);
        assert_eq!(rows[0].record.note, "tempo");
        assert_eq!(rows[1].date_label, "2024/01/01");
        assert_eq!(rows[1].days_from_previous, 0);
    }
}
