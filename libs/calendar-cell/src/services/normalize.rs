use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate};
use chrono_tz::Tz;
use tracing::warn;

use shared_models::window::local_midnight;
use shared_models::CalendarEvent;

use crate::models::{GoogleEvent, GoogleEventTime};

fn resolve_time(time: &GoogleEventTime, tz: Tz) -> Option<(DateTime<Tz>, bool)> {
    if let Some(raw) = time.date_time.as_deref() {
        return DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| (dt.with_timezone(&tz), false));
    }

    time.date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .map(|date| (local_midnight(tz, date), true))
}

/// Converts a wire event into the operator's timezone. All-day events start
/// and end at local midnight; the exclusive end date is kept as-is. Events
/// without a readable start are dropped.
pub fn normalize_event(raw: &GoogleEvent, tz: Tz) -> Option<CalendarEvent> {
    let Some((start, all_day)) = raw.start.as_ref().and_then(|t| resolve_time(t, tz)) else {
        warn!("Skipping event {:?} without a readable start", raw.id);
        return None;
    };

    let end = raw
        .end
        .as_ref()
        .and_then(|t| resolve_time(t, tz))
        .map(|(end, _)| end)
        .filter(|end| *end >= start)
        .unwrap_or_else(|| {
            if all_day {
                start
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .map(|next| local_midnight(tz, next))
                    .unwrap_or(start)
            } else {
                start
            }
        });

    Some(CalendarEvent {
        id: raw.id.clone().unwrap_or_default(),
        title: raw.summary.clone(),
        start,
        end,
        all_day,
        location: raw.location.clone().filter(|l| !l.trim().is_empty()),
    })
}

/// Identity of one occurrence across calendars. Recurring instances share an
/// iCalUID, so the start instant is part of the key.
pub fn occurrence_key(raw: &GoogleEvent, event: &CalendarEvent) -> (String, i64) {
    let uid = raw
        .ical_uid
        .clone()
        .or_else(|| raw.id.clone())
        .unwrap_or_else(|| event.title_text().to_string());
    (uid, event.start.timestamp())
}

/// Drops repeated occurrences, keeping the first seen, then orders by start.
pub fn dedup_and_sort(keyed: Vec<((String, i64), CalendarEvent)>) -> Vec<CalendarEvent> {
    let mut seen = HashSet::new();
    let mut events: Vec<CalendarEvent> = keyed
        .into_iter()
        .filter(|(key, _)| seen.insert(key.clone()))
        .map(|(_, event)| event)
        .collect();

    events.sort_by_key(|e| e.start);
    events
}
