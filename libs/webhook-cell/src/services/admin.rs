use tracing::{error, info};

use report_cell::{ReportMode, ReportService};

use crate::models::{AdminCommand, EMPTY_ECHO_TEXT};

/// Parses an admin message. Returns `None` unless the text starts with
/// `prefix`; an empty prefix disables admin commands entirely.
pub fn parse_admin_command(text: &str, prefix: &str) -> Option<AdminCommand> {
    if prefix.is_empty() {
        return None;
    }
    let rest = text.trim().strip_prefix(prefix)?.trim();

    let command = match rest.to_lowercase().as_str() {
        "統計" | "stats" => AdminCommand::Stats,
        "明天" | "tomorrow" => AdminCommand::Tomorrow,
        _ => AdminCommand::Echo(rest.to_string()),
    };
    Some(command)
}

/// Text to reply for `command`. Failures are reported back to the admin.
pub async fn admin_reply(reports: &ReportService, command: &AdminCommand) -> String {
    match command {
        AdminCommand::Stats => {
            match reports.build_stats_report(reports.now(), ReportMode::CurrentFullMonth).await {
                Ok(report) => report.text,
                Err(e) => {
                    error!("On-demand stats failed: {}", e);
                    format!("統計失敗：{}", e)
                }
            }
        }
        AdminCommand::Tomorrow => match reports.build_tomorrow_digest(reports.now(), false).await {
            Ok(digest) => digest.text,
            Err(e) => {
                error!("Digest preview failed: {}", e);
                format!("明日摘要失敗：{}", e)
            }
        },
        AdminCommand::Echo(rest) if rest.is_empty() => EMPTY_ECHO_TEXT.to_string(),
        AdminCommand::Echo(rest) => {
            info!("Echoing admin message");
            rest.clone()
        }
    }
}
