//! Core error types for paycheck-core.
//!
//! Every stage of an invocation returns one of these. The first failure
//! aborts the run and is surfaced unchanged to the trigger.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core error type for paycheck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Time-tracking source unreachable or rejected the request
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Required configuration missing or unparseable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Currency conversion lookup failed
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Notification could not be delivered
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Input data violated an invariant
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Time-tracking fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure
    #[error("request to time-tracking service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("time-tracking service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("malformed time-tracking response: {0}")]
    Malformed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Currency conversion errors.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("request to exchange-rate service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("exchange-rate service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Service answered but reported the conversion as unsuccessful
    #[error("exchange-rate service rejected the conversion: {0}")]
    Rejected(String),

    #[error("malformed exchange-rate response: {0}")]
    Malformed(String),
}

/// Notification publish errors.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("request to messaging service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("messaging service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Publish acknowledged without a message id
    #[error("messaging service response did not contain a MessageId")]
    MissingMessageId,

    /// No usable credentials for signing
    #[error("messaging credentials unavailable: {0}")]
    Credentials(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A time entry reported negative hours
    #[error("time entry {index} has negative hours ({hours})")]
    NegativeHours { index: usize, hours: Decimal },

    /// Rounding increment must be strictly positive
    #[error("rounding increment must be greater than zero, got {0}")]
    NonPositiveIncrement(Decimal),

    /// Arithmetic left the range `Decimal` can represent
    #[error("{operation} is out of range")]
    Overflow { operation: &'static str },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
