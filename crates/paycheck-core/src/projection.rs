//! Remaining business-day hours until month end.

use chrono::{DateTime, Datelike, Duration, TimeZone, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Hours credited for each remaining weekday.
pub const DEFAULT_WORKDAY_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Forecast of hours still workable this month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRemainingHours {
    pub hours: Decimal,
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Credit `per_day_hours` for every Monday-Friday strictly after `from`
/// up to and including `month_end`.
///
/// Both instants must share a time zone; weekdays are read in that zone.
/// Returns zero when `from` is already past `month_end`.
///
/// # Errors
///
/// Returns [`ValidationError::Overflow`] if `per_day_hours` times the number
/// of remaining weekdays does not fit in a `Decimal`.
pub fn project_remaining_hours<Tz: TimeZone>(
    from: &DateTime<Tz>,
    month_end: &DateTime<Tz>,
    per_day_hours: Decimal,
) -> Result<ProjectedRemainingHours, ValidationError> {
    let mut weekdays = 0u32;
    let mut day = from.clone() + Duration::days(1);

    while day <= *month_end {
        if !is_weekend(day.weekday()) {
            weekdays += 1;
        }
        day = day + Duration::days(1);
    }

    let hours = Decimal::from(weekdays)
        .checked_mul(per_day_hours)
        .ok_or(ValidationError::Overflow {
            operation: "projected hours",
        })?;
    Ok(ProjectedRemainingHours { hours })
}
