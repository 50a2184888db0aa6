//! Harvest integration -- logged time entries via the Harvest v2 REST API.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;

use crate::config::HarvestSettings;
use crate::error::FetchError;
use crate::hours::TimeEntry;
use crate::integrations::traits::TimeEntrySource;

const USER_AGENT_VALUE: &str = concat!("paycheck/", env!("CARGO_PKG_VERSION"));

/// One page of `GET /v2/time_entries`.
#[derive(Debug, Deserialize)]
struct TimeEntriesPage {
    time_entries: Vec<TimeEntry>,
    #[serde(default)]
    next_page: Option<u32>,
}

pub struct HarvestClient {
    settings: HarvestSettings,
    http_client: Client,
}

impl HarvestClient {
    pub fn new(settings: HarvestSettings) -> Self {
        Self {
            settings,
            http_client: Client::new(),
        }
    }

    fn time_entries_url(&self) -> String {
        format!(
            "{}/v2/time_entries",
            self.settings.base_url.as_str().trim_end_matches('/')
        )
    }

    async fn fetch_page(
        &self,
        from: &str,
        to: &str,
        page: u32,
    ) -> Result<TimeEntriesPage, FetchError> {
        let page_param = page.to_string();
        let resp = self
            .http_client
            .get(self.time_entries_url())
            .bearer_auth(&self.settings.access_token)
            .header("Harvest-Account-Id", &self.settings.account_id)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .query(&[
                ("client_id", self.settings.client_id.as_str()),
                ("from", from),
                ("to", to),
                ("page", page_param.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TimeEntrySource for HarvestClient {
    async fn fetch_entries(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeEntry>, FetchError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let body = self.fetch_page(&from, &to, page).await?;
            tracing::debug!(page, count = body.time_entries.len(), "fetched time entries page");

            if body.time_entries.is_empty() && body.next_page.is_some() {
                tracing::warn!(page, "empty page with a next_page link; stopping");
                break;
            }
            entries.extend(body.time_entries);

            match body.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(entries)
    }
}
