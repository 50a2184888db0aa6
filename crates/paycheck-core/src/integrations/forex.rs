//! Currency conversion via an exchangerate.host-compatible `/convert` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;

use crate::config::ForexSettings;
use crate::error::ConversionError;
use crate::integrations::traits::CurrencyConverter;

pub struct ForexClient {
    settings: ForexSettings,
    http_client: Client,
}

impl ForexClient {
    pub fn new(settings: ForexSettings) -> Self {
        Self {
            settings,
            http_client: Client::new(),
        }
    }

    fn convert_url(&self) -> String {
        format!("{}/convert", self.settings.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl CurrencyConverter for ForexClient {
    async fn convert(&self, amount: Decimal) -> Result<Decimal, ConversionError> {
        let amount_param = amount.to_string();
        let mut query = vec![
            ("from", self.settings.from_currency.as_str()),
            ("to", self.settings.to_currency.as_str()),
            ("amount", amount_param.as_str()),
        ];
        if let Some(key) = &self.settings.access_key {
            query.push(("access_key", key.as_str()));
        }

        let resp = self
            .http_client
            .get(self.convert_url())
            .query(&query)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ConversionError::Status { status, body });
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ConversionError::Malformed(e.to_string()))?;

        if data.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let reason = data
                .get("error")
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(ConversionError::Rejected(reason));
        }

        let result = data
            .get("result")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ConversionError::Malformed("missing result".into()))?;

        let converted: Decimal = serde_json::from_value(result.clone())
            .map_err(|e| ConversionError::Malformed(format!("result is not a number: {e}")))?;

        tracing::debug!(
            %amount,
            %converted,
            from = %self.settings.from_currency,
            to = %self.settings.to_currency,
            "converted amount"
        );
        Ok(converted)
    }

    fn target_currency(&self) -> &str {
        &self.settings.to_currency
    }
}

/// Converts with a constant rate, without any network call.
#[derive(Debug, Clone)]
pub struct FixedRateConverter {
    rate: Decimal,
    currency: String,
}

impl FixedRateConverter {
    pub fn new(rate: Decimal, currency: impl Into<String>) -> Self {
        Self {
            rate,
            currency: currency.into(),
        }
    }

    /// Rate of exactly one: amounts pass through unchanged.
    pub fn identity(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ONE, currency)
    }
}

#[async_trait]
impl CurrencyConverter for FixedRateConverter {
    async fn convert(&self, amount: Decimal) -> Result<Decimal, ConversionError> {
        amount
            .checked_mul(self.rate)
            .ok_or_else(|| ConversionError::Rejected(format!("{amount} x {} is out of range", self.rate)))
    }

    fn target_currency(&self) -> &str {
        &self.currency
    }
}
