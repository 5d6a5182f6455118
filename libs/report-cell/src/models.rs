use serde::Serialize;
use thiserror::Error;

use calendar_cell::CalendarError;
use messaging_cell::{DeliveryReport, FailedDelivery};
use shared_database::RegistryError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DurationBucket {
    OneHour,
    HalfHour,
    FortyFiveMin,
}

/// Session counts per billing bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTally {
    pub one_hour: u32,
    pub half_hour: u32,
    pub forty_five_min: u32,
}

impl SessionTally {
    pub fn single(bucket: DurationBucket) -> Self {
        let mut tally = Self::default();
        tally.add(bucket);
        tally
    }

    pub fn add(&mut self, bucket: DurationBucket) {
        match bucket {
            DurationBucket::OneHour => self.one_hour += 1,
            DurationBucket::HalfHour => self.half_hour += 1,
            DurationBucket::FortyFiveMin => self.forty_five_min += 1,
        }
    }

    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.one_hour, self.half_hour, self.forty_five_min)
    }

    pub fn total(&self) -> u32 {
        self.one_hour + self.half_hour + self.forty_five_min
    }
}

impl std::ops::AddAssign for SessionTally {
    fn add_assign(&mut self, other: Self) {
        self.one_hour += other.one_hour;
        self.half_hour += other.half_hour;
        self.forty_five_min += other.forty_five_min;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    Tomorrow,
    CurrentFullMonth,
    LastFullMonth,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Calendar fetch failed: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Registry read failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Could not compute a report window for {0}")]
    Window(String),
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Calendar(_) | ReportError::Registry(_) => AppError::Upstream(e.to_string()),
            ReportError::Window(_) => AppError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    PartialFailure,
    Skipped,
}

/// Stats for one window, rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub month: u32,
    pub window_start: String,
    pub window_end: String,
    pub billable_events: usize,
    pub tally: SessionTally,
    pub text: String,
}

/// Reminder pass results before anything is sent to operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderDigest {
    pub events: usize,
    pub reminders_sent: Vec<String>,
    pub follow_ups: Vec<String>,
    pub failed_reminders: Vec<FailedDelivery>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderRunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub events: usize,
    pub reminders_sent: usize,
    pub follow_ups: Vec<String>,
    pub failed_deliveries: Vec<FailedDelivery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub reason: Option<String>,
    pub report: Option<StatsReport>,
    pub failed_deliveries: Vec<FailedDelivery>,
}

pub fn status_for(report: &DeliveryReport) -> RunStatus {
    if report.is_complete() {
        RunStatus::Completed
    } else {
        RunStatus::PartialFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_accumulates() {
        let mut tally = SessionTally::single(DurationBucket::OneHour);
        tally += SessionTally::single(DurationBucket::HalfHour);
        tally.add(DurationBucket::OneHour);

        assert_eq!(tally.as_tuple(), (2, 1, 0));
        assert_eq!(tally.total(), 3);
    }
}
