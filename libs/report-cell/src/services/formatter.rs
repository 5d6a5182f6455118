use shared_models::{CalendarEvent, PatientRecord};

use crate::models::SessionTally;

pub const DIGEST_HEADER: &str = "提醒（明天行程）：";
pub const EMPTY_DIGEST_LINE: &str = "明天沒有任何排程 ✅";
pub const FOLLOW_UP_HEADER: &str = "待確認（名冊中找不到）：";
pub const FAILED_REMINDER_HEADER: &str = "提醒發送失敗：";

const ALL_DAY: &str = "整天";
const UNTITLED: &str = "（無標題）";

pub fn format_monthly_stats(tally: &SessionTally, month: u32) -> String {
    format!(
        "{}月的總人次\n一小時：{}\n半小時：{}\n45分鐘：{}",
        month, tally.one_hour, tally.half_hour, tally.forty_five_min
    )
}

fn time_range(event: &CalendarEvent) -> String {
    if event.all_day {
        ALL_DAY.to_string()
    } else {
        format!("{}–{}", event.start.format("%H:%M"), event.end.format("%H:%M"))
    }
}

fn event_line(event: &CalendarEvent) -> String {
    let title = match event.title_text() {
        "" => UNTITLED,
        title => title,
    };
    let location = match event.location_text() {
        "" => String::new(),
        loc => format!("（{}）", loc),
    };
    format!("・{}  {}{}", time_range(event), title, location)
}

/// Operator digest for tomorrow. Sections for unmatched names and failed
/// patient reminders are appended only when non-empty.
pub fn format_digest(events: &[CalendarEvent], follow_ups: &[String], failed: &[String]) -> String {
    let mut lines = vec![DIGEST_HEADER.to_string()];

    if events.is_empty() {
        lines.push(EMPTY_DIGEST_LINE.to_string());
    } else {
        lines.extend(events.iter().map(event_line));
    }

    if !follow_ups.is_empty() {
        lines.push(String::new());
        lines.push(FOLLOW_UP_HEADER.to_string());
        lines.extend(follow_ups.iter().map(|name| format!("・{}", name)));
    }

    if !failed.is_empty() {
        lines.push(String::new());
        lines.push(FAILED_REMINDER_HEADER.to_string());
        lines.extend(failed.iter().map(|name| format!("・{}", name)));
    }

    lines.join("\n")
}

pub fn format_patient_reminder(record: &PatientRecord, event: &CalendarEvent) -> String {
    let mut text = format!(
        "{} 您好，提醒您明天 {} 有預約",
        record.preferred_name(),
        time_range(event)
    );
    if !event.location_text().is_empty() {
        text.push_str(&format!("，地點：{}", event.location_text()));
    }
    text.push_str("。如需更改時間，請直接回覆此訊息。");
    text
}
