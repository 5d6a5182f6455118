use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use calendar_cell::GoogleCalendarClient;
use messaging_cell::LineClient;
use report_cell::ReportService;
use shared_config::AppConfig;
use shared_database::google_auth::{CALENDAR_READONLY_SCOPE, SPREADSHEETS_SCOPE};
use shared_database::{ServiceAccountTokenProvider, SheetsClient, SheetsPatientRegistry};
use webhook_cell::WebhookService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic notification service");

    let config = Arc::new(AppConfig::from_env().context("invalid configuration")?);

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let tokens = Arc::new(
        ServiceAccountTokenProvider::new(
            http.clone(),
            &config.google_service_account_json,
            &[CALENDAR_READONLY_SCOPE, SPREADSHEETS_SCOPE],
        )
        .context("invalid GOOGLE_SERVICE_ACCOUNT_JSON")?,
    );

    let calendar = Arc::new(GoogleCalendarClient::new(http.clone(), &config, tokens.clone()));
    let sheets = SheetsClient::new(
        http.clone(),
        &config.google_sheets_base_url,
        &config.sheet_id,
        tokens,
    );
    let registry = Arc::new(SheetsPatientRegistry::new(sheets, &config.sheet_name));
    let messaging = Arc::new(LineClient::new(http, &config));

    let reports = Arc::new(ReportService::new(
        config.clone(),
        calendar,
        registry.clone(),
        messaging.clone(),
    ));
    let webhook = Arc::new(WebhookService::new(
        config.clone(),
        messaging,
        registry,
        reports.clone(),
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(config.clone(), reports, webhook)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
