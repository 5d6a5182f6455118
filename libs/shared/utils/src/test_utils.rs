use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono_tz::Tz;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use shared_config::{AppConfig, MatchMode, MonthlyTriggerPolicy};

pub struct TestConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub trigger_secret: String,
    pub admin_user_ids: Vec<String>,
    pub operator_email: String,
    pub calendar_ids: Vec<String>,
    pub base_url: String,
    pub timezone: Tz,
    pub monthly_trigger_policy: MonthlyTriggerPolicy,
    pub match_mode: MatchMode,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            channel_secret: "test-channel-secret".to_string(),
            channel_access_token: "test-channel-access-token".to_string(),
            trigger_secret: "test-trigger-secret".to_string(),
            admin_user_ids: vec!["Uadmin".to_string()],
            operator_email: "therapist@example.com".to_string(),
            calendar_ids: vec!["clinic@group.calendar.google.com".to_string()],
            base_url: "http://localhost:54321".to_string(),
            timezone: chrono_tz::Asia::Taipei,
            monthly_trigger_policy: MonthlyTriggerPolicy::FirstDay,
            match_mode: MatchMode::Exact,
        }
    }
}

impl TestConfig {
    /// Points every outbound API at one mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_admins(mut self, admins: &[&str]) -> Self {
        self.admin_user_ids = admins.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_policy(mut self, policy: MonthlyTriggerPolicy) -> Self {
        self.monthly_trigger_policy = policy;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            channel_secret: self.channel_secret.clone(),
            channel_access_token: self.channel_access_token.clone(),
            google_service_account_json: "{}".to_string(),
            sheet_id: "test-sheet".to_string(),
            sheet_name: "Patients".to_string(),
            calendar_ids: self.calendar_ids.clone(),
            operator_email: self.operator_email.clone(),
            trigger_secret: self.trigger_secret.clone(),
            admin_user_ids: self.admin_user_ids.clone(),
            timezone: self.timezone,
            dev_only_prefix: "#dev".to_string(),
            monthly_trigger_policy: self.monthly_trigger_policy,
            match_mode: self.match_mode,
            port: 0,
            http_timeout: Duration::from_secs(5),
            line_api_base_url: self.base_url.clone(),
            google_calendar_base_url: self.base_url.clone(),
            google_sheets_base_url: self.base_url.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Signs a webhook body the way the messaging platform does.
pub fn sign_body(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
