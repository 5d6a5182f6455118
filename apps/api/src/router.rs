use std::sync::Arc;

use axum::Router;

use report_cell::router::report_routes;
use report_cell::ReportService;
use shared_config::AppConfig;
use webhook_cell::router::webhook_routes;
use webhook_cell::WebhookService;

pub fn create_router(
    config: Arc<AppConfig>,
    reports: Arc<ReportService>,
    webhook: Arc<WebhookService>,
) -> Router {
    Router::new()
        .merge(webhook_routes(webhook))
        .nest("/tasks", report_routes(reports, config))
}
