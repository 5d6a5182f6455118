use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

/// Half-open `[start, end)` interval in operator civil time, aligned to
/// midnight boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl ReportWindow {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Window from the midnight starting `first` to the midnight starting
    /// `end_exclusive`.
    pub fn from_dates(tz: Tz, first: NaiveDate, end_exclusive: NaiveDate) -> Option<Self> {
        Self::new(local_midnight(tz, first), local_midnight(tz, end_exclusive))
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days()
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// First instant of `date` in `tz`. When midnight falls in a DST gap the
/// first valid instant after it is used.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    (0..=4)
        .find_map(|half_hours| {
            tz.from_local_datetime(&(naive + Duration::minutes(30 * half_hours)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
