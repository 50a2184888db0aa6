//! # Paycheck Core Library
//!
//! Monthly income summary for a freelancer billing by the hour. One
//! invocation fetches the month's logged hours, estimates net income after
//! currency conversion and taxes, and publishes a short notification.
//!
//! ## Architecture
//!
//! - **Hours**: per-entry rounding and summation of logged time
//! - **Projection**: remaining weekday hours until month end
//! - **Income**: gross -> taxable -> tax -> net, in the local currency
//! - **Summary**: locale-formatted notification text
//! - **Integrations**: Harvest (time entries), exchange-rate lookup, Amazon SNS
//!
//! ## Key Components
//!
//! - [`Settings`]: configuration read once from the environment
//! - [`Invocation`]: the single linear pipeline
//! - [`TimeEntrySource`], [`CurrencyConverter`], [`MessagePublisher`]: seams
//!   for the external services

pub mod config;
pub mod error;
pub mod hours;
pub mod income;
pub mod integrations;
pub mod period;
pub mod pipeline;
pub mod projection;
pub mod summary;

pub use config::{AwsCredentials, CredentialSource, ForexSettings, HarvestSettings, Settings, SnsSettings};
pub use error::{ConfigError, ConversionError, CoreError, FetchError, PublishError, ValidationError};
pub use hours::{aggregate, MonthlyHoursSummary, TimeEntry};
pub use income::{estimate_income, IncomeEstimate, IncomeRates};
pub use integrations::{CurrencyConverter, MessagePublisher, TimeEntrySource};
pub use period::{month_range, DateRange};
pub use pipeline::{run_once, Invocation, InvocationReport};
pub use projection::{project_remaining_hours, ProjectedRemainingHours};
pub use summary::{format_summary, SummaryMessage};
