#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use calendar_cell::models::CalendarListEntry;
use calendar_cell::{CalendarError, CalendarSource};
use messaging_cell::{DeliveryError, MessagingClient, Profile};
use report_cell::ReportService;
use shared_config::AppConfig;
use shared_database::{GoogleApiError, InMemoryPatientRegistry};
use shared_models::{CalendarEvent, ReportWindow};
use webhook_cell::WebhookService;

pub struct StaticCalendar {
    pub fail: bool,
}

#[async_trait]
impl CalendarSource for StaticCalendar {
    async fn list_my_events(
        &self,
        _window: &ReportWindow,
        _calendar_ids: &[String],
        _operator_email: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if self.fail {
            return Err(CalendarError::List(GoogleApiError::Auth("token rejected".to_string())));
        }
        Ok(Vec::new())
    }

    async fn list_visible_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError> {
        Ok(Vec::new())
    }
}

/// Records replies; profile lookups fail when `profile_fails` is set.
#[derive(Default)]
pub struct RecordingMessenger {
    pub replies: Mutex<Vec<(String, String)>>,
    pub profile_fails: bool,
}

impl RecordingMessenger {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    async fn push(&self, _recipient_id: &str, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), DeliveryError> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Profile, DeliveryError> {
        if self.profile_fails {
            return Err(DeliveryError::Api {
                status: 404,
                body: "not found".to_string(),
            });
        }
        Ok(Profile {
            display_name: "小明".to_string(),
            user_id: user_id.to_string(),
            picture_url: None,
        })
    }
}

pub struct Harness {
    pub service: Arc<WebhookService>,
    pub messenger: Arc<RecordingMessenger>,
    pub registry: Arc<InMemoryPatientRegistry>,
}

pub fn harness(config: AppConfig, messenger: RecordingMessenger, calendar_fails: bool) -> Harness {
    let config = Arc::new(config);
    let messenger = Arc::new(messenger);
    let registry = Arc::new(InMemoryPatientRegistry::new());

    let reports = Arc::new(ReportService::new(
        config.clone(),
        Arc::new(StaticCalendar { fail: calendar_fails }),
        registry.clone(),
        messenger.clone(),
    ));
    let service = Arc::new(WebhookService::new(
        config,
        messenger.clone(),
        registry.clone(),
        reports,
    ));

    Harness {
        service,
        messenger,
        registry,
    }
}
