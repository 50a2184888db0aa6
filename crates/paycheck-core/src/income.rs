//! Net income estimation.
//!
//! ```text
//! gross_local    = convert(hours * hourly_rate)
//! taxable_income = gross_local - fixed_monthly_costs
//! income_tax     = max(0, taxable_income * tax_rate)
//! net_income     = taxable_income - income_tax
//! ```
//!
//! Each call is independent. The pipeline runs it twice per invocation:
//! once for logged hours and once for logged plus projected hours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::integrations::traits::CurrencyConverter;

/// Rates and costs the estimate is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRates {
    /// Billed per hour, in the invoicing currency.
    pub hourly_rate: Decimal,
    /// Fixed monthly costs in the local currency, deducted before tax.
    pub fixed_monthly_costs: Decimal,
    /// Fraction of taxable income owed as tax (0.19 = 19%).
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeEstimate {
    pub gross_local: Decimal,
    /// May be negative when costs exceed gross income.
    pub taxable_income: Decimal,
    /// Never negative.
    pub income_tax: Decimal,
    pub net_income: Decimal,
}

impl IncomeEstimate {
    pub const ZERO: Self = Self {
        gross_local: Decimal::ZERO,
        taxable_income: Decimal::ZERO,
        income_tax: Decimal::ZERO,
        net_income: Decimal::ZERO,
    };

    fn from_gross(gross_local: Decimal, rates: &IncomeRates) -> Result<Self, ValidationError> {
        let taxable_income = gross_local
            .checked_sub(rates.fixed_monthly_costs)
            .ok_or(ValidationError::Overflow {
                operation: "taxable income",
            })?;
        let income_tax = taxable_income
            .checked_mul(rates.tax_rate)
            .ok_or(ValidationError::Overflow {
                operation: "income tax",
            })?
            .max(Decimal::ZERO);
        let net_income = taxable_income
            .checked_sub(income_tax)
            .ok_or(ValidationError::Overflow {
                operation: "net income",
            })?;

        Ok(Self {
            gross_local,
            taxable_income,
            income_tax,
            net_income,
        })
    }
}

/// Estimate net income for `hours_worked`.
///
/// Zero hours returns [`IncomeEstimate::ZERO`] without calling the converter.
///
/// # Errors
///
/// Propagates the converter's error; a failed lookup is never replaced by a
/// zero amount. Returns [`ValidationError::Overflow`] when a product or
/// difference does not fit in a `Decimal`.
pub async fn estimate_income<C>(
    hours_worked: Decimal,
    rates: &IncomeRates,
    converter: &C,
) -> Result<IncomeEstimate>
where
    C: CurrencyConverter + ?Sized,
{
    if hours_worked.is_zero() {
        return Ok(IncomeEstimate::ZERO);
    }

    let billed = hours_worked
        .checked_mul(rates.hourly_rate)
        .ok_or(ValidationError::Overflow {
            operation: "billed amount",
        })?;
    let gross_local = converter.convert(billed).await?;
    Ok(IncomeEstimate::from_gross(gross_local, rates)?)
}
