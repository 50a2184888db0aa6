//! Environment-based configuration.
//!
//! Settings are read once at start-up into a plain struct and passed by
//! reference into each component. Recognised variables:
//! - Harvest: `HARVEST_ACCOUNT_ID`, `HARVEST_ACCESS_TOKEN`, `HARVEST_CLIENT_ID`,
//!   `HARVEST_BASE_URL`
//! - Income: `HOURLY_RATE`, `ESTIMATED_MONTHLY_FIXED_TAXES`, `ESTIMATED_TAX_RATE`,
//!   `HOURS_ROUNDING_INCREMENT`, `WORKDAY_HOURS`
//! - Currency: `SOURCE_CURRENCY`, `TARGET_CURRENCY`, `FOREX_BASE_URL`, `FOREX_ACCESS_KEY`
//! - Messaging: `AWS_REGION`, `AWS_ID`, `AWS_KEY`, `SNS_TOPIC_ARN`, `SNS_ENDPOINT`
//!
//! Without `AWS_REGION` the region comes from `AWS_DEFAULT_REGION`, then from
//! the `AWS_PROFILE` section of the shared config file (`AWS_CONFIG_FILE`,
//! default `~/.aws/config`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use url::Url;

use crate::error::ConfigError;
use crate::hours::DEFAULT_ROUNDING_INCREMENT;
use crate::income::IncomeRates;
use crate::integrations::aws_profile::ProfileFiles;
use crate::projection::DEFAULT_WORKDAY_HOURS;

const DEFAULT_HARVEST_BASE_URL: &str = "https://api.harvestapp.com";
const DEFAULT_FOREX_BASE_URL: &str = "https://api.exchangerate.host";
const DEFAULT_SOURCE_CURRENCY: &str = "usd";
const DEFAULT_TARGET_CURRENCY: &str = "pln";
const MAX_WORKDAY_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Harvest API access and client filter.
#[derive(Clone)]
pub struct HarvestSettings {
    pub base_url: Url,
    pub account_id: String,
    pub access_token: String,
    pub client_id: String,
}

/// Exchange-rate service and conversion direction.
#[derive(Clone)]
pub struct ForexSettings {
    pub base_url: Url,
    pub from_currency: String,
    pub to_currency: String,
    pub access_key: Option<String>,
}

/// Access key pair used to sign AWS requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Where publish credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `AWS_ID` / `AWS_KEY` supplied explicitly.
    Static(AwsCredentials),
    /// Resolved from the runtime's standard variables at publish time.
    Environment,
}

/// SNS destination and transport.
#[derive(Debug, Clone)]
pub struct SnsSettings {
    pub region: String,
    pub topic_arn: String,
    pub credentials: CredentialSource,
    /// Override for the regional endpoint (tests, VPC endpoints).
    pub endpoint: Option<Url>,
}

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub harvest: HarvestSettings,
    pub income: IncomeRates,
    pub forex: ForexSettings,
    pub sns: SnsSettings,
    pub rounding_increment: Decimal,
    pub workday_hours: Decimal,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] for absent or blank required keys
    /// and [`ConfigError::InvalidValue`] for values that do not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let harvest = HarvestSettings {
            base_url: env.url_or("HARVEST_BASE_URL", DEFAULT_HARVEST_BASE_URL)?,
            account_id: env.required("HARVEST_ACCOUNT_ID")?,
            access_token: env.required("HARVEST_ACCESS_TOKEN")?,
            client_id: env.required("HARVEST_CLIENT_ID")?,
        };

        let income = IncomeRates {
            hourly_rate: env.decimal("HOURLY_RATE")?,
            fixed_monthly_costs: env.decimal("ESTIMATED_MONTHLY_FIXED_TAXES")?,
            tax_rate: env.decimal("ESTIMATED_TAX_RATE")?,
        };

        let forex = ForexSettings {
            base_url: env.url_or("FOREX_BASE_URL", DEFAULT_FOREX_BASE_URL)?,
            from_currency: env
                .optional("SOURCE_CURRENCY")
                .unwrap_or_else(|| DEFAULT_SOURCE_CURRENCY.to_string()),
            to_currency: env
                .optional("TARGET_CURRENCY")
                .unwrap_or_else(|| DEFAULT_TARGET_CURRENCY.to_string()),
            access_key: env.optional("FOREX_ACCESS_KEY"),
        };

        // Static keys only when both halves are present
        let credentials = match (env.optional("AWS_ID"), env.optional("AWS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => {
                CredentialSource::Static(AwsCredentials {
                    access_key_id,
                    secret_access_key,
                    session_token: None,
                })
            }
            _ => CredentialSource::Environment,
        };

        let sns = SnsSettings {
            region: env.region()?,
            topic_arn: env.required("SNS_TOPIC_ARN")?,
            credentials,
            endpoint: env
                .optional("SNS_ENDPOINT")
                .map(|raw| parse_url("SNS_ENDPOINT", &raw))
                .transpose()?,
        };

        let rounding_increment =
            env.decimal_or("HOURS_ROUNDING_INCREMENT", DEFAULT_ROUNDING_INCREMENT)?;
        if rounding_increment <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "HOURS_ROUNDING_INCREMENT".into(),
                message: "must be greater than zero".into(),
            });
        }

        let workday_hours = env.decimal_or("WORKDAY_HOURS", DEFAULT_WORKDAY_HOURS)?;
        if workday_hours < Decimal::ZERO || workday_hours > MAX_WORKDAY_HOURS {
            return Err(ConfigError::InvalidValue {
                key: "WORKDAY_HOURS".into(),
                message: format!("must be between 0 and {MAX_WORKDAY_HOURS}"),
            });
        }

        Ok(Self {
            harvest,
            income,
            forex,
            sns,
            rounding_increment,
            workday_hours,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value, trimmed.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    fn decimal(&self, key: &str) -> Result<Decimal, ConfigError> {
        parse_decimal(key, &self.required(key)?)
    }

    fn decimal_or(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        match self.optional(key) {
            Some(raw) => parse_decimal(key, &raw),
            None => Ok(default),
        }
    }

    fn region(&self) -> Result<String, ConfigError> {
        self.optional("AWS_REGION")
            .or_else(|| self.optional("AWS_DEFAULT_REGION"))
            .or_else(|| ProfileFiles::from_lookup(|key| self.optional(key)).region())
            .ok_or_else(|| ConfigError::MissingKey("AWS_REGION".into()))
    }

    fn url_or(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
        parse_url(key, &raw)
    }
}

fn parse_decimal(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a number: {e}"),
        })
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not a valid URL: {e}"),
    })
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for HarvestSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestSettings")
            .field("base_url", &self.base_url.as_str())
            .field("account_id", &self.account_id)
            .field("access_token", &REDACTED)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl fmt::Debug for ForexSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForexSettings")
            .field("base_url", &self.base_url.as_str())
            .field("from_currency", &self.from_currency)
            .field("to_currency", &self.to_currency)
            .field("access_key", &self.access_key.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field("session_token", &self.session_token.as_ref().map(|_| REDACTED))
            .finish()
    }
}
