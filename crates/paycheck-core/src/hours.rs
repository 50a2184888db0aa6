//! Monthly hours aggregation.
//!
//! Each logged entry is snapped to the nearest multiple of the rounding
//! increment before summing (sum-of-rounded, never round-of-sum). Midpoints
//! round away from zero, so with a quarter-hour increment 0.125h becomes 0.25h.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Quarter-hour granularity.
pub const DEFAULT_ROUNDING_INCREMENT: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// A single logged work record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub spent_date: Option<NaiveDate>,
    pub hours: Decimal,
}

impl TimeEntry {
    pub fn new(hours: Decimal) -> Self {
        Self {
            id: None,
            spent_date: None,
            hours,
        }
    }
}

/// Total of the month's entries after per-entry rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyHoursSummary {
    pub total_rounded_hours: Decimal,
}

/// Round `hours` to the nearest multiple of `increment`, midpoints away from zero.
///
/// `increment` must be positive; [`aggregate`] checks this before calling.
///
/// # Errors
///
/// Returns [`ValidationError::Overflow`] when the quotient does not fit, as
/// happens with a very small increment.
pub fn round_to_increment(hours: Decimal, increment: Decimal) -> Result<Decimal, ValidationError> {
    let overflow = ValidationError::Overflow {
        operation: "hours rounding",
    };
    hours
        .checked_div(increment)
        .ok_or(overflow.clone())?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(increment)
        .ok_or(overflow)
}

/// Sum the entries, each rounded individually to `increment`.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositiveIncrement`] if `increment <= 0` and
/// [`ValidationError::NegativeHours`] for the first entry with negative hours,
/// and [`ValidationError::Overflow`] if rounding or the total leaves the
/// `Decimal` range.
pub fn aggregate(
    entries: &[TimeEntry],
    increment: Decimal,
) -> Result<MonthlyHoursSummary, ValidationError> {
    if increment <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveIncrement(increment));
    }

    let mut total = Decimal::ZERO;
    for (index, entry) in entries.iter().enumerate() {
        if entry.hours < Decimal::ZERO {
            return Err(ValidationError::NegativeHours {
                index,
                hours: entry.hours,
            });
        }
        tracing::debug!(hours = %entry.hours, date = ?entry.spent_date, "time entry");
        total = total
            .checked_add(round_to_increment(entry.hours, increment)?)
            .ok_or(ValidationError::Overflow {
                operation: "total hours",
            })?;
    }

    Ok(MonthlyHoursSummary {
        total_rounded_hours: total,
    })
}
