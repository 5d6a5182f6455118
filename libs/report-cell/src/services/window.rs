use chrono::{DateTime, Datelike, Days, NaiveDate};
use chrono_tz::Tz;

use shared_config::MonthlyTriggerPolicy;
use shared_models::ReportWindow;

use crate::models::ReportMode;

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(chrono::Months::new(1))?;
    u32::try_from((next - first).num_days()).ok()
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

fn month_window(tz: Tz, first: NaiveDate) -> Option<ReportWindow> {
    let days = days_in_month(first.year(), first.month())?;
    let next = first.checked_add_days(Days::new(u64::from(days)))?;
    ReportWindow::from_dates(tz, first, next)
}

/// Window for `mode` as seen from `now` in the operator's timezone.
pub fn compute_window(now: DateTime<Tz>, mode: ReportMode) -> Option<ReportWindow> {
    let tz = now.timezone();
    let today = now.date_naive();

    match mode {
        ReportMode::Tomorrow => {
            let tomorrow = today.checked_add_days(Days::new(1))?;
            let after = tomorrow.checked_add_days(Days::new(1))?;
            ReportWindow::from_dates(tz, tomorrow, after)
        }
        ReportMode::CurrentFullMonth => month_window(tz, first_of_month(today)?),
        ReportMode::LastFullMonth => {
            let previous_last = first_of_month(today)?.pred_opt()?;
            month_window(tz, first_of_month(previous_last)?)
        }
    }
}

/// Month a scheduled stats run should report on `today`, or `None` when the
/// policy says today is not a reporting day.
pub fn scheduled_target(today: NaiveDate, policy: MonthlyTriggerPolicy) -> Option<ReportMode> {
    let last_day = days_in_month(today.year(), today.month())?;

    match policy {
        MonthlyTriggerPolicy::FirstDay => (today.day() == 1).then_some(ReportMode::LastFullMonth),
        MonthlyTriggerPolicy::SecondToLastDay => {
            (today.day() == last_day - 1).then_some(ReportMode::CurrentFullMonth)
        }
        MonthlyTriggerPolicy::LastDay => {
            (today.day() == last_day).then_some(ReportMode::CurrentFullMonth)
        }
    }
}
