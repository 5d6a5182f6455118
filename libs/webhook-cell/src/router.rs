use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::WebhookService;

pub fn webhook_routes(service: Arc<WebhookService>) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/callback", post(handlers::callback))
        .with_state(service)
}
