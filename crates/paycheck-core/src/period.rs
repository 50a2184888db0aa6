//! Calendar-month boundaries for the current invocation.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Start and end instants of one calendar month, in a single time zone.
#[derive(Debug, Clone)]
pub struct DateRange<Tz: TimeZone> {
    /// First day of the month at 00:00:00.
    pub start: DateTime<Tz>,
    /// Last day of the month at 23:59:59.999999999.
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DateRange<Tz> {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Bounds of the calendar month containing `now`, in `now`'s time zone.
pub fn month_range<Tz: TimeZone>(now: &DateTime<Tz>) -> DateRange<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(today.day0()));
    let next_first = first + Months::new(1);

    let start = resolve_local(&tz, first.and_time(NaiveTime::MIN));
    let end = resolve_local(&tz, next_first.and_time(NaiveTime::MIN)) - Duration::nanoseconds(1);

    DateRange { start, end }
}

// Midnight can fall inside a DST gap; fall back to reading the wall time as UTC.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
