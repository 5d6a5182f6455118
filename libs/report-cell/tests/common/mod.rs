#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;
use chrono_tz::Asia::Taipei;

use calendar_cell::models::CalendarListEntry;
use calendar_cell::{CalendarError, CalendarSource};
use messaging_cell::{DeliveryError, MessagingClient, Profile};
use shared_config::AppConfig;
use shared_database::{GoogleApiError, InMemoryPatientRegistry, PatientRegistry, RegistryError, UpsertOutcome};
use shared_models::{CalendarEvent, PatientRecord, ReportWindow};

use report_cell::ReportService;

pub fn event(id: &str, title: &str, (y, m, d): (i32, u32, u32), (h, min): (u32, u32)) -> CalendarEvent {
    let start = Taipei.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();
    CalendarEvent {
        id: id.to_string(),
        title: Some(title.to_string()),
        start,
        end: start + chrono::Duration::hours(1),
        all_day: false,
        location: None,
    }
}

/// Calendar returning a fixed set of events, filtered to the window asked for.
pub struct FakeCalendar {
    events: Vec<CalendarEvent>,
    fail: bool,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { events, fail: false }
    }

    pub fn failing() -> Self {
        Self { events: Vec::new(), fail: true }
    }
}

#[async_trait]
impl CalendarSource for FakeCalendar {
    async fn list_my_events(
        &self,
        window: &ReportWindow,
        _calendar_ids: &[String],
        _operator_email: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if self.fail {
            return Err(CalendarError::Fetch {
                calendar_id: "clinic@group.calendar.google.com".to_string(),
                source: GoogleApiError::Api {
                    status: 503,
                    body: "backend error".to_string(),
                },
            });
        }
        Ok(self
            .events
            .iter()
            .filter(|e| window.contains(&e.start))
            .cloned()
            .collect())
    }

    async fn list_visible_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError> {
        Ok(Vec::new())
    }
}

pub struct FailingRegistry;

#[async_trait]
impl PatientRegistry for FailingRegistry {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError> {
        Err(RegistryError::Read(GoogleApiError::Api {
            status: 500,
            body: "sheet unavailable".to_string(),
        }))
    }

    async fn upsert_patient(&self, _: &str, _: &str) -> Result<UpsertOutcome, RegistryError> {
        Err(RegistryError::Invalid("read only".to_string()))
    }
}

/// Records every push; recipients in `blocked` fail.
#[derive(Default)]
pub struct RecordingMessenger {
    pub pushes: Mutex<Vec<(String, String)>>,
    pub blocked: HashSet<String>,
}

impl RecordingMessenger {
    pub fn blocking(recipients: &[&str]) -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            blocked: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn texts_to(&self, recipient: &str) -> Vec<String> {
        self.pushes()
            .into_iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    async fn push(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        if self.blocked.contains(recipient_id) {
            return Err(DeliveryError::Api {
                status: 400,
                body: "{\"message\":\"blocked\"}".to_string(),
            });
        }
        self.pushes
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn reply(&self, _reply_token: &str, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Profile, DeliveryError> {
        Ok(Profile {
            display_name: "Someone".to_string(),
            user_id: user_id.to_string(),
            picture_url: None,
        })
    }
}

pub fn patients() -> Vec<PatientRecord> {
    vec![
        PatientRecord::new("Ming", "王小明", "Uming"),
        PatientRecord::new("阿華", "", "Uhua"),
    ]
}

pub fn service(
    config: AppConfig,
    calendar: FakeCalendar,
    registry: Arc<dyn PatientRegistry>,
    messenger: Arc<RecordingMessenger>,
) -> ReportService {
    ReportService::new(Arc::new(config), Arc::new(calendar), registry, messenger)
}

pub fn registry() -> Arc<dyn PatientRegistry> {
    Arc::new(InMemoryPatientRegistry::with_patients(patients()))
}
