use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// One calendar occurrence, already filtered to the operator's own events and
/// expressed in the operator's timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Date-only events, normalized to midnight boundaries.
    pub all_day: bool,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Trimmed title, empty when the event has none.
    pub fn title_text(&self) -> &str {
        self.title.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn location_text(&self) -> &str {
        self.location.as_deref().map(str::trim).unwrap_or("")
    }

    /// Billable entries carry a `prefix - Name` title; everything else is
    /// treated as a personal entry.
    pub fn is_billable(&self) -> bool {
        self.title_text().contains('-')
    }
}
