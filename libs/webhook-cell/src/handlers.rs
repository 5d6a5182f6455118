use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap};
use tracing::{debug, info, warn};

use messaging_cell::WebhookPayload;
use shared_models::error::AppError;

use crate::services::WebhookService;

pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

pub async fn health() -> &'static str {
    "OK"
}

pub async fn callback(
    State(service): State<Arc<WebhookService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !service.verify_signature(&body, signature) {
        warn!("Rejected webhook with an invalid signature");
        return Err(AppError::InvalidSignature);
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    info!("Webhook delivered {} events", payload.events.len());
    for event in &payload.events {
        let outcome = service.handle_event(event).await;
        debug!("Webhook event handled: {:?}", outcome);
    }

    Ok("OK")
}
