use std::sync::Arc;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use calendar_cell::CalendarSource;
use messaging_cell::{broadcast, DeliveryReport, FailedDelivery, MessagingClient};
use shared_config::AppConfig;
use shared_database::PatientRegistry;
use shared_models::{CalendarEvent, ReportWindow};

use crate::models::{
    status_for, ReminderDigest, ReminderRunSummary, ReportError, ReportMode, RunStatus,
    SessionTally, StatsReport, StatsRunSummary,
};
use crate::services::classifier::classify;
use crate::services::formatter::{format_digest, format_monthly_stats, format_patient_reminder};
use crate::services::matcher::{MatchStrategy, NameIndex};
use crate::services::name_extractor::extract_name;
use crate::services::window::{compute_window, scheduled_target};

/// Runs the reminder and stats passes against the calendar, the registry and
/// the messaging channel.
pub struct ReportService {
    config: Arc<AppConfig>,
    calendar: Arc<dyn CalendarSource>,
    registry: Arc<dyn PatientRegistry>,
    messaging: Arc<dyn MessagingClient>,
    strategy: MatchStrategy,
}

impl ReportService {
    pub fn new(
        config: Arc<AppConfig>,
        calendar: Arc<dyn CalendarSource>,
        registry: Arc<dyn PatientRegistry>,
        messaging: Arc<dyn MessagingClient>,
    ) -> Self {
        let strategy = MatchStrategy::from(config.match_mode);
        Self {
            config,
            calendar,
            registry,
            messaging,
            strategy,
        }
    }

    /// Current instant in the operator's timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.config.timezone)
    }

    fn window_for(&self, now: DateTime<Tz>, mode: ReportMode) -> Result<ReportWindow, ReportError> {
        compute_window(now, mode).ok_or_else(|| ReportError::Window(format!("{:?} at {}", mode, now)))
    }

    async fn fetch_events(&self, window: &ReportWindow) -> Result<Vec<CalendarEvent>, ReportError> {
        let events = self
            .calendar
            .list_my_events(window, &self.config.calendar_ids, &self.config.operator_email)
            .await
            .map_err(|e| {
                error!("Calendar fetch failed: {}", e);
                ReportError::from(e)
            })?;

        debug!(
            "Fetched {} events for {} .. {}",
            events.len(),
            window.start(),
            window.end()
        );
        Ok(events)
    }

    /// Session counts for the window `mode` resolves to from `now`.
    pub async fn build_stats_report(
        &self,
        now: DateTime<Tz>,
        mode: ReportMode,
    ) -> Result<StatsReport, ReportError> {
        let window = self.window_for(now, mode)?;
        let events = self.fetch_events(&window).await?;

        let mut tally = SessionTally::default();
        let mut billable_events = 0;
        for event in events.iter().filter(|e| e.is_billable()) {
            tally += classify(event.title_text());
            billable_events += 1;
        }

        let month = window.first_day().month();
        info!(
            "Stats for month {}: {} billable events, {} sessions {:?}",
            month,
            billable_events,
            tally.total(),
            tally.as_tuple()
        );

        Ok(StatsReport {
            month,
            window_start: window.start().to_rfc3339_opts(SecondsFormat::Secs, false),
            window_end: window.end().to_rfc3339_opts(SecondsFormat::Secs, false),
            billable_events,
            tally,
            text: format_monthly_stats(&tally, month),
        })
    }

    /// Tomorrow's events, matched against the registry. With
    /// `send_reminders` each matched patient gets a personal reminder;
    /// otherwise nothing is sent and the digest is a preview.
    ///
    /// Both the calendar and the registry are read before any message goes
    /// out, so an upstream failure never leaves a partial run behind.
    pub async fn build_tomorrow_digest(
        &self,
        now: DateTime<Tz>,
        send_reminders: bool,
    ) -> Result<ReminderDigest, ReportError> {
        let window = self.window_for(now, ReportMode::Tomorrow)?;
        let events = self.fetch_events(&window).await?;

        let patients = self.registry.list_patients().await.map_err(|e| {
            error!("Registry read failed: {}", e);
            ReportError::from(e)
        })?;
        let index = NameIndex::build(&patients);
        debug!("Name index built from {} registry rows", index.len());

        let mut reminders_sent = Vec::new();
        let mut failed_reminders = Vec::new();
        let mut failed_names = Vec::new();
        let mut follow_ups: Vec<String> = Vec::new();

        for event in events.iter().filter(|e| e.is_billable()) {
            let title = event.title_text();
            let name = extract_name(title);
            if name.is_empty() && self.strategy == MatchStrategy::ExactKey {
                debug!("No name candidate in '{}'", title);
                continue;
            }

            let Some(record) = self.strategy.resolve(&index, title, &name) else {
                if !name.is_empty() && !follow_ups.contains(&name) {
                    follow_ups.push(name);
                }
                continue;
            };

            if !send_reminders {
                continue;
            }

            let text = format_patient_reminder(record, event);
            match self.messaging.push(&record.external_id, &text).await {
                Ok(()) => {
                    info!("[PUSH OK] reminder -> {}", record.external_id);
                    reminders_sent.push(record.external_id.clone());
                }
                Err(e) => {
                    warn!("[PUSH FAIL] reminder -> {}: {}", record.external_id, e);
                    failed_names.push(record.preferred_name().to_string());
                    failed_reminders.push(FailedDelivery {
                        recipient: record.external_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let text = format_digest(&events, &follow_ups, &failed_names);

        Ok(ReminderDigest {
            events: events.len(),
            reminders_sent,
            follow_ups,
            failed_reminders,
            text,
        })
    }

    async fn log_visible_calendars(&self) {
        match self.calendar.list_visible_calendars().await {
            Ok(calendars) => {
                debug!("Service identity can see {} calendars", calendars.len());
                for entry in &calendars {
                    debug!("  calendar {} ({})", entry.id, entry.summary.as_deref().unwrap_or(""));
                }
            }
            Err(e) => warn!("Could not list visible calendars: {}", e),
        }
    }

    async fn deliver_to_admins(&self, text: &str) -> DeliveryReport {
        if self.config.admin_user_ids.is_empty() {
            warn!("No admin recipients configured; report not delivered:\n{}", text);
            return DeliveryReport::default();
        }
        broadcast(self.messaging.as_ref(), &self.config.admin_user_ids, text).await
    }

    /// Daily pass: patient reminders, then the operator digest.
    pub async fn run_reminder_pass(&self, now: DateTime<Tz>) -> Result<ReminderRunSummary, ReportError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("reminder_pass", run_id = %run_id);

        async {
            info!("Starting reminder pass");
            self.log_visible_calendars().await;

            let digest = self.build_tomorrow_digest(now, true).await?;
            let admin_report = self.deliver_to_admins(&digest.text).await;

            let mut failed_deliveries = digest.failed_reminders.clone();
            failed_deliveries.extend(admin_report.failed.iter().cloned());

            let status = if failed_deliveries.is_empty() {
                RunStatus::Completed
            } else {
                RunStatus::PartialFailure
            };

            info!(
                "Reminder pass done: {} events, {} reminders, {} failed deliveries",
                digest.events,
                digest.reminders_sent.len(),
                failed_deliveries.len()
            );

            Ok::<_, ReportError>(ReminderRunSummary {
                run_id: run_id.clone(),
                status,
                events: digest.events,
                reminders_sent: digest.reminders_sent.len(),
                follow_ups: digest.follow_ups,
                failed_deliveries,
            })
        }
        .instrument(span)
        .await
    }

    /// Monthly pass. Scheduled runs only report on the days the configured
    /// policy allows; manual runs always report the current month.
    pub async fn run_stats_pass(
        &self,
        now: DateTime<Tz>,
        manual: bool,
    ) -> Result<StatsRunSummary, ReportError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("stats_pass", run_id = %run_id, manual);

        async {
            let target = if manual {
                Some(ReportMode::CurrentFullMonth)
            } else {
                scheduled_target(now.date_naive(), self.config.monthly_trigger_policy)
            };

            let Some(mode) = target else {
                let reason = format!(
                    "{} is not a reporting day under {:?}",
                    now.date_naive(),
                    self.config.monthly_trigger_policy
                );
                info!("Skipping stats pass: {}", reason);
                return Ok(StatsRunSummary {
                    run_id: run_id.clone(),
                    status: RunStatus::Skipped,
                    reason: Some(reason),
                    report: None,
                    failed_deliveries: Vec::new(),
                });
            };

            let report = self.build_stats_report(now, mode).await?;
            let delivery = self.deliver_to_admins(&report.text).await;

            Ok::<_, ReportError>(StatsRunSummary {
                run_id: run_id.clone(),
                status: status_for(&delivery),
                reason: None,
                report: Some(report),
                failed_deliveries: delivery.failed,
            })
        }
        .instrument(span)
        .await
    }
}
