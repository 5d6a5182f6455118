pub mod admin;
pub mod follow;

use std::sync::Arc;

use tracing::{debug, warn};

use messaging_cell::{IncomingMessage, MessagingClient, WebhookEvent};
use report_cell::ReportService;
use shared_config::AppConfig;
use shared_database::PatientRegistry;
use shared_utils::signature::verify_webhook_signature;

use crate::models::{EventOutcome, StepOutcome};

pub use admin::{admin_reply, parse_admin_command};
pub use follow::handle_follow;

/// Dispatches verified webhook events.
pub struct WebhookService {
    config: Arc<AppConfig>,
    messaging: Arc<dyn MessagingClient>,
    registry: Arc<dyn PatientRegistry>,
    reports: Arc<ReportService>,
}

impl WebhookService {
    pub fn new(
        config: Arc<AppConfig>,
        messaging: Arc<dyn MessagingClient>,
        registry: Arc<dyn PatientRegistry>,
        reports: Arc<ReportService>,
    ) -> Self {
        Self {
            config,
            messaging,
            registry,
            reports,
        }
    }

    /// Checks `X-Line-Signature` against the raw request body.
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        verify_webhook_signature(&self.config.channel_secret, body, signature)
    }

    pub async fn handle_event(&self, event: &WebhookEvent) -> EventOutcome {
        match event {
            WebhookEvent::Follow { reply_token, source } => {
                let Some(user_id) = source.user_id.as_deref() else {
                    return EventOutcome::Ignored("follow without user id");
                };
                let outcome = handle_follow(
                    self.messaging.as_ref(),
                    self.registry.as_ref(),
                    user_id,
                    reply_token.as_deref(),
                )
                .await;
                EventOutcome::Followed(outcome)
            }
            WebhookEvent::Message {
                reply_token,
                source,
                message: IncomingMessage::Text { text },
            } => {
                let Some(user_id) = source.user_id.as_deref() else {
                    return EventOutcome::Ignored("message without user id");
                };
                if !self.config.is_admin(user_id) {
                    return EventOutcome::Ignored("sender is not an admin");
                }
                let Some(command) = parse_admin_command(text, &self.config.dev_only_prefix) else {
                    return EventOutcome::Ignored("missing admin prefix");
                };

                let text = admin_reply(&self.reports, &command).await;
                let reply: StepOutcome<()> = match reply_token.as_deref() {
                    Some(token) => self.messaging.reply(token, &text).await.into(),
                    None => StepOutcome::Skipped("no reply token"),
                };
                if let StepOutcome::Failed(e) = &reply {
                    warn!("[ADMIN REPLY FAIL] {}: {}", user_id, e);
                }

                EventOutcome::AdminReplied { command, reply }
            }
            WebhookEvent::Message { .. } => EventOutcome::Ignored("non-text message"),
            WebhookEvent::Unsupported => {
                debug!("Ignoring unsupported webhook event");
                EventOutcome::Ignored("unsupported event")
            }
        }
    }
}
