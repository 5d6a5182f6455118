use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use chrono_tz::Tz;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::{GoogleApiError, TokenProvider};
use shared_models::{CalendarEvent, ReportWindow};

use crate::models::{CalendarError, CalendarListEntry, CalendarListResponse, GoogleEventList};
use crate::services::normalize::{dedup_and_sort, normalize_event, occurrence_key};
use crate::services::ownership::is_owned_by;
use crate::services::CalendarSource;

const PAGE_SIZE: &str = "2500";
const CALENDAR_LIST_PAGE_SIZE: &str = "250";

/// Google Calendar v3 client reading expanded single events.
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    timezone: Tz,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, config: &AppConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            base_url: config.google_calendar_base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone,
            tokens,
        }
    }

    async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, GoogleApiError>
    where
        T: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Calendar API error ({}): {}", status, body);
            return Err(GoogleApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Every page of events for one calendar.
    async fn fetch_calendar(
        &self,
        calendar_id: &str,
        window: &ReportWindow,
    ) -> Result<GoogleEventList, GoogleApiError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );
        let time_min = window.start().to_rfc3339_opts(SecondsFormat::Secs, false);
        let time_max = window.end().to_rfc3339_opts(SecondsFormat::Secs, false);

        let mut all = GoogleEventList::default();
        let mut page_token: Option<String> = None;

        loop {
            let page: GoogleEventList = {
                let mut query = vec![
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                    ("maxResults", PAGE_SIZE),
                    ("timeZone", self.timezone.name()),
                ];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.get(&url, &query).await?
            };
            debug!("Calendar {} returned {} events on this page", calendar_id, page.items.len());
            all.items.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(all)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn list_my_events(
        &self,
        window: &ReportWindow,
        calendar_ids: &[String],
        operator_email: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut keyed = Vec::new();

        for calendar_id in calendar_ids {
            debug!("Querying calendar: {}", calendar_id);

            let list = self
                .fetch_calendar(calendar_id, window)
                .await
                .map_err(|source| CalendarError::Fetch {
                    calendar_id: calendar_id.clone(),
                    source,
                })?;

            let fetched = list.items.len();
            let mut kept = 0usize;
            for raw in &list.items {
                if raw.is_cancelled() || !is_owned_by(raw, operator_email) {
                    continue;
                }
                if let Some(event) = normalize_event(raw, self.timezone) {
                    keyed.push((occurrence_key(raw, &event), event));
                    kept += 1;
                }
            }

            debug!("Calendar {}: kept {} of {} events", calendar_id, kept, fetched);
        }

        let events = dedup_and_sort(keyed);
        info!(
            "Fetched {} own events between {} and {}",
            events.len(),
            window.start(),
            window.end()
        );
        Ok(events)
    }

    async fn list_visible_calendars(&self) -> Result<Vec<CalendarListEntry>, CalendarError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: CalendarListResponse = {
                let mut query = vec![("maxResults", CALENDAR_LIST_PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.get(&url, &query).await.map_err(CalendarError::List)?
            };
            for entry in &page.items {
                debug!(
                    "Visible calendar: {} ({})",
                    entry.id,
                    entry.summary.as_deref().unwrap_or("")
                );
            }
            calendars.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(calendars)
    }
}
