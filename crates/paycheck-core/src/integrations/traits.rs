use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{ConversionError, FetchError, PublishError};
use crate::hours::TimeEntry;

/// Source of logged work records.
/// Implementations hold their own credentials and client filter.
#[async_trait]
pub trait TimeEntrySource: Send + Sync {
    /// All entries spent between `from` and `to`, both inclusive.
    async fn fetch_entries(&self, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<TimeEntry>, FetchError>;
}

/// Converts an amount from the invoicing currency to the local one.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    async fn convert(&self, amount: Decimal) -> Result<Decimal, ConversionError>;

    /// ISO code of the currency `convert` produces (e.g. "PLN").
    fn target_currency(&self) -> &str;
}

/// Delivers a finished summary to a destination (topic, channel, ...).
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Returns the service's delivery id for the message.
    async fn publish(&self, message: &str, destination: &str) -> Result<String, PublishError>;
}
