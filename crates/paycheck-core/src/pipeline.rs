//! One invocation: Fetch -> Aggregate -> Project -> Estimate (x2) -> Format -> Publish.
//!
//! Stages run strictly in order. The first failure aborts the rest, so a
//! notification is only ever sent for a fully computed summary.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::config::Settings;
use crate::error::{Result, ValidationError};
use crate::hours::{aggregate, MonthlyHoursSummary};
use crate::income::{estimate_income, IncomeEstimate};
use crate::integrations::traits::{CurrencyConverter, MessagePublisher, TimeEntrySource};
use crate::integrations::{ForexClient, HarvestClient, SnsPublisher};
use crate::period::month_range;
use crate::projection::{project_remaining_hours, ProjectedRemainingHours};
use crate::summary::{format_summary, SummaryMessage};

/// Everything one successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub summary: SummaryMessage,
    pub delivery_id: String,
    pub hours: MonthlyHoursSummary,
    pub projected: ProjectedRemainingHours,
    /// Estimate for hours already logged.
    pub actual: IncomeEstimate,
    /// Estimate for logged plus projected hours.
    pub potential: IncomeEstimate,
}

pub struct Invocation<'a> {
    settings: &'a Settings,
    source: &'a dyn TimeEntrySource,
    converter: &'a dyn CurrencyConverter,
    publisher: &'a dyn MessagePublisher,
}

impl<'a> Invocation<'a> {
    pub fn new(
        settings: &'a Settings,
        source: &'a dyn TimeEntrySource,
        converter: &'a dyn CurrencyConverter,
        publisher: &'a dyn MessagePublisher,
    ) -> Self {
        Self {
            settings,
            source,
            converter,
            publisher,
        }
    }

    /// Run the pipeline for the month containing `now`.
    ///
    /// `now` also anchors the projection, so its time zone decides which
    /// calendar days count as weekdays.
    ///
    /// # Errors
    ///
    /// Returns the first stage error; nothing is published in that case.
    pub async fn run<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Result<InvocationReport> {
        let range = month_range(&now);
        let (from, to) = (range.start_date(), range.end_date());

        let entries = self.source.fetch_entries(from, to).await?;
        tracing::info!(%from, %to, count = entries.len(), "fetched time entries");

        let hours = aggregate(&entries, self.settings.rounding_increment)?;
        tracing::info!(total = %hours.total_rounded_hours, "aggregated logged hours");

        let projected = project_remaining_hours(&now, &range.end, self.settings.workday_hours)?;
        tracing::info!(remaining = %projected.hours, "projected remaining hours");

        let income = &self.settings.income;
        let potential_hours = hours
            .total_rounded_hours
            .checked_add(projected.hours)
            .ok_or(ValidationError::Overflow {
                operation: "potential hours",
            })?;

        let actual = estimate_income(hours.total_rounded_hours, income, self.converter).await?;
        let potential = estimate_income(potential_hours, income, self.converter).await?;
        tracing::info!(
            net = %actual.net_income,
            potential = %potential.net_income,
            "estimated income"
        );

        let summary = format_summary(
            hours.total_rounded_hours,
            actual.net_income,
            potential.net_income,
            self.converter.target_currency(),
        );
        tracing::info!(text = %summary.text, "publishing summary");

        let delivery_id = self
            .publisher
            .publish(&summary.text, &self.settings.sns.topic_arn)
            .await?;
        tracing::info!(%delivery_id, "summary published");

        Ok(InvocationReport {
            summary,
            delivery_id,
            hours,
            projected,
            actual,
            potential,
        })
    }
}

/// Run once against the live Harvest, exchange-rate and SNS services.
///
/// # Errors
///
/// Returns the first failure, including an unusable SNS endpoint.
pub async fn run_once<Tz: TimeZone>(settings: &Settings, now: DateTime<Tz>) -> Result<InvocationReport> {
    let source = HarvestClient::new(settings.harvest.clone());
    let converter = ForexClient::new(settings.forex.clone());
    let publisher = SnsPublisher::new(settings.sns.clone())?;

    Invocation::new(settings, &source, &converter, &publisher)
        .run(now)
        .await
}
