use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::signature::secrets_match;

pub const TRIGGER_SECRET_HEADER: &str = "X-Trigger-Secret";

/// Secret presented either in `X-Trigger-Secret` or as a bearer token.
pub fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(TRIGGER_SECRET_HEADER) {
        return value.to_str().ok();
    }

    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

// Guards scheduled-task routes; rejected requests never reach the handler.
pub async fn trigger_secret_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = presented_secret(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing trigger secret".to_string()))?;

    if !secrets_match(&config.trigger_secret, provided) {
        warn!("Rejected trigger request with an invalid secret");
        return Err(AppError::Unauthorized("Invalid trigger secret".to_string()));
    }

    Ok(next.run(request).await)
}
