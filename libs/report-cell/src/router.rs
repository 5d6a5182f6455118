use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::trigger_secret_middleware;

use crate::handlers;
use crate::services::ReportService;

/// Scheduler-facing task routes. Every route requires the trigger secret.
pub fn report_routes(service: Arc<ReportService>, config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/daily-reminder", post(handlers::trigger_daily_reminder))
        .route("/monthly-stats", post(handlers::trigger_monthly_stats))
        .layer(middleware::from_fn_with_state(config, trigger_secret_middleware))
        .with_state(service)
}
