use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use shared_models::error::AppError;

use crate::models::{ReminderRunSummary, StatsRunSummary};
use crate::services::ReportService;

#[derive(Debug, Default, Deserialize)]
pub struct StatsTriggerQuery {
    #[serde(default)]
    pub manual: bool,
}

pub async fn trigger_daily_reminder(
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ReminderRunSummary>, AppError> {
    info!("Daily reminder triggered");
    let summary = service.run_reminder_pass(service.now()).await?;
    Ok(Json(summary))
}

pub async fn trigger_monthly_stats(
    State(service): State<Arc<ReportService>>,
    Query(query): Query<StatsTriggerQuery>,
) -> Result<Json<StatsRunSummary>, AppError> {
    info!("Monthly stats triggered (manual: {})", query.manual);
    let summary = service.run_stats_pass(service.now(), query.manual).await?;
    Ok(Json(summary))
}
