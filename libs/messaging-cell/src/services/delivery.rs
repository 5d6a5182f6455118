use tracing::{info, warn};

use crate::models::{DeliveryReport, FailedDelivery};
use crate::services::MessagingClient;

/// Pushes `text` to every recipient in order. A failed push is logged and
/// recorded; it never stops the remaining recipients.
pub async fn broadcast(
    client: &dyn MessagingClient,
    recipients: &[String],
    text: &str,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for recipient in recipients {
        match client.push(recipient, text).await {
            Ok(()) => {
                info!("[PUSH OK] -> {}", recipient);
                report.delivered.push(recipient.clone());
            }
            Err(e) => {
                warn!("[PUSH FAIL] -> {}: {}", recipient, e);
                report.failed.push(FailedDelivery {
                    recipient: recipient.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
