use tracing::{info, warn};

use messaging_cell::MessagingClient;
use shared_database::{PatientRegistry, UpsertOutcome};

use crate::models::{FollowOutcome, StepOutcome, WELCOME_TEXT};

/// Registers a new follower and welcomes them. Each step runs even when the
/// previous one failed; without a profile the row is stored with an empty
/// display name.
pub async fn handle_follow(
    messaging: &dyn MessagingClient,
    registry: &dyn PatientRegistry,
    user_id: &str,
    reply_token: Option<&str>,
) -> FollowOutcome {
    let profile: StepOutcome<String> = messaging
        .profile(user_id)
        .await
        .map(|p| p.display_name)
        .into();
    if let StepOutcome::Failed(e) = &profile {
        warn!("[PROFILE FAIL] {}: {}", user_id, e);
    }

    let display_name = match &profile {
        StepOutcome::Done(name) => name.as_str(),
        _ => "",
    };

    let registry_step: StepOutcome<UpsertOutcome> = registry.upsert_patient(display_name, user_id).await.into();
    match &registry_step {
        StepOutcome::Done(outcome) => info!("Registry {:?} for {}", outcome, user_id),
        StepOutcome::Failed(e) => warn!("[SHEET UPSERT FAIL] {}: {}", user_id, e),
        StepOutcome::Skipped(_) => {}
    }

    let welcome = match reply_token {
        Some(token) => {
            let step: StepOutcome<()> = messaging.reply(token, WELCOME_TEXT).await.into();
            if let StepOutcome::Failed(e) = &step {
                warn!("[FOLLOW REPLY FAIL] {}: {}", user_id, e);
            }
            step
        }
        None => StepOutcome::Skipped("no reply token"),
    };

    info!(
        "Follow handled for {} (profile: {}, registered: {}, welcomed: {})",
        user_id,
        profile.is_done(),
        registry_step.is_done(),
        welcome.is_done()
    );

    FollowOutcome {
        user_id: user_id.to_string(),
        profile,
        registry: registry_step,
        welcome,
    }
}
