pub mod google;
pub mod normalize;
pub mod ownership;

use async_trait::async_trait;

use shared_models::{CalendarEvent, ReportWindow};

use crate::models::{CalendarError, CalendarListEntry};

pub use google::GoogleCalendarClient;

/// Read side of the operator's calendars.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events in `window` across `calendar_ids` that belong to
    /// `operator_email`: created or organized by them, or attended without
    /// declining. Cancelled events are dropped, duplicates across calendars
    /// collapsed, and the result ordered by start time.
    async fn list_my_events(
        &self,
        window: &ReportWindow,
        calendar_ids: &[String],
        operator_email: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Calendars the service identity can see.
    async fn list_visible_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError>;
}
