//! Human-readable summary text.
//!
//! Numbers are written in English locale style: two decimals, `.` as the
//! decimal point and `,` between thousands (`12,345.60`).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The text handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMessage {
    pub text: String,
}

/// Figures read back out of a [`SummaryMessage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryFigures {
    pub total_hours: Decimal,
    pub net_actual: Decimal,
    pub net_potential: Decimal,
}

const HOURS_LABEL: &str = "Total Hours: ";
const ACTUAL_LABEL: &str = "Estimated Pay After Taxes ";
const POTENTIAL_LABEL: &str = "Potential Income: ";

/// Format `value` with two decimals and thousands separators.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let negative = rounded < Decimal::ZERO;
    let digits = rounded.abs().to_string();

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Inverse of [`format_amount`].
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let plain: String = text.trim().chars().filter(|c| *c != ',').collect();
    plain.parse().ok()
}

/// Build the notification text.
///
/// ```text
/// Total Hours: 120.50
/// Estimated Pay After Taxes 18,240.00 PLN
/// Potential Income: 25,412.80
/// ```
pub fn format_summary(
    total_hours: Decimal,
    net_actual: Decimal,
    net_potential: Decimal,
    currency: &str,
) -> SummaryMessage {
    let text = format!(
        "{HOURS_LABEL}{}\n{ACTUAL_LABEL}{} {}\n{POTENTIAL_LABEL}{}\n",
        format_amount(total_hours),
        format_amount(net_actual),
        currency.to_uppercase(),
        format_amount(net_potential),
    );
    SummaryMessage { text }
}

impl SummaryMessage {
    /// Read the three figures back from the text.
    pub fn figures(&self) -> Option<SummaryFigures> {
        let mut lines = self.text.lines();
        let total_hours = parse_amount(lines.next()?.strip_prefix(HOURS_LABEL)?)?;
        let net_actual = parse_amount(
            lines
                .next()?
                .strip_prefix(ACTUAL_LABEL)?
                .split_whitespace()
                .next()?,
        )?;
        let net_potential = parse_amount(lines.next()?.strip_prefix(POTENTIAL_LABEL)?)?;

        Some(SummaryFigures {
            total_hours,
            net_actual,
            net_potential,
        })
    }
}
