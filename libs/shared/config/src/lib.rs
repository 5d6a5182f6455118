use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";
pub const DEFAULT_GOOGLE_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_GOOGLE_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Which day of the month a scheduled stats run is allowed to report on,
/// and which month it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthlyTriggerPolicy {
    /// Runs on the 1st and reports the month that just ended.
    FirstDay,
    /// Runs on the second-to-last day and reports the current month,
    /// including appointments already booked for the remaining days.
    SecondToLastDay,
    /// Runs on the last day and reports the current month.
    LastDay,
}

impl FromStr for MonthlyTriggerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-day" | "first" => Ok(Self::FirstDay),
            "second-to-last-day" | "second-to-last" => Ok(Self::SecondToLastDay),
            "last-day" | "last" => Ok(Self::LastDay),
            other => Err(format!("unknown monthly trigger policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Extracted name looked up by exact key, real names first.
    Exact,
    /// Longest registered name contained in the event title.
    Containment,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "exact-key" => Ok(Self::Exact),
            "containment" | "substring" => Ok(Self::Containment),
            other => Err(format!("unknown match mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub google_service_account_json: String,
    pub sheet_id: String,
    pub sheet_name: String,
    pub calendar_ids: Vec<String>,
    pub operator_email: String,
    pub trigger_secret: String,
    pub admin_user_ids: Vec<String>,
    pub timezone: Tz,
    pub dev_only_prefix: String,
    pub monthly_trigger_policy: MonthlyTriggerPolicy,
    pub match_mode: MatchMode,
    pub port: u16,
    pub http_timeout: Duration,
    pub line_api_base_url: String,
    pub google_calendar_base_url: String,
    pub google_sheets_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Values are trimmed and
    /// empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let calendar_ids = parse_csv(&required("CALENDAR_IDS")?);
        if calendar_ids.is_empty() {
            return Err(ConfigError::Missing("CALENDAR_IDS"));
        }

        let admin_user_ids = get("ADMIN_USER_IDS").map(|v| parse_csv(&v)).unwrap_or_default();
        if admin_user_ids.is_empty() {
            warn!("ADMIN_USER_IDS is empty, operator digests and reports will only be logged");
        }

        let timezone = match get("TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                key: "TIMEZONE",
                reason: e.to_string(),
            })?,
            None => chrono_tz::Asia::Taipei,
        };

        let monthly_trigger_policy = match get("MONTHLY_TRIGGER_POLICY") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                key: "MONTHLY_TRIGGER_POLICY",
                reason,
            })?,
            None => MonthlyTriggerPolicy::FirstDay,
        };

        let match_mode = match get("MATCH_MODE") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                key: "MATCH_MODE",
                reason,
            })?,
            None => MatchMode::Exact,
        };

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "HTTP_TIMEOUT_SECS",
                reason: e.to_string(),
            })?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            channel_secret: required("CHANNEL_SECRET")?,
            channel_access_token: required("CHANNEL_ACCESS_TOKEN")?,
            google_service_account_json: required("GOOGLE_SERVICE_ACCOUNT_JSON")?,
            sheet_id: required("SHEET_ID")?,
            sheet_name: get("SHEET_NAME").unwrap_or_else(|| "Patients".to_string()),
            calendar_ids,
            operator_email: required("MY_EMAIL")?,
            trigger_secret: required("TRIGGER_SECRET")?,
            admin_user_ids,
            timezone,
            dev_only_prefix: get("DEV_ONLY_PREFIX").unwrap_or_else(|| "#dev".to_string()),
            monthly_trigger_policy,
            match_mode,
            port,
            http_timeout,
            line_api_base_url: get("LINE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string()),
            google_calendar_base_url: get("GOOGLE_CALENDAR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GOOGLE_CALENDAR_BASE_URL.to_string()),
            google_sheets_base_url: get("GOOGLE_SHEETS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GOOGLE_SHEETS_BASE_URL.to_string()),
        })
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.iter().any(|id| id == user_id)
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
