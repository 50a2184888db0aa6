//! Integration tests for the invocation pipeline.
//!
//! External services are replaced with in-memory stand-ins so the stage
//! ordering and abort-on-first-error behavior can be checked directly.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use paycheck_core::integrations::FixedRateConverter;
use paycheck_core::{
    ConversionError, CoreError, CurrencyConverter, FetchError, Invocation, MessagePublisher,
    PublishError, Settings, TimeEntry, TimeEntrySource, ValidationError,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Stand-ins
// ============================================================================

struct StaticSource {
    entries: Vec<TimeEntry>,
    requested: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl StaticSource {
    fn new(hours: &[&str]) -> Self {
        Self {
            entries: hours
                .iter()
                .map(|h| TimeEntry::new(h.parse().unwrap()))
                .collect(),
            requested: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TimeEntrySource for StaticSource {
    async fn fetch_entries(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeEntry>, FetchError> {
        *self.requested.lock().unwrap() = Some((from, to));
        Ok(self.entries.clone())
    }
}

struct UnreachableSource;

#[async_trait]
impl TimeEntrySource for UnreachableSource {
    async fn fetch_entries(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<TimeEntry>, FetchError> {
        Err(FetchError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    }
}

struct CountingConverter {
    inner: FixedRateConverter,
    calls: AtomicUsize,
}

impl CountingConverter {
    fn identity() -> Self {
        Self {
            inner: FixedRateConverter::identity("USD"),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CurrencyConverter for CountingConverter {
    async fn convert(&self, amount: Decimal) -> Result<Decimal, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.convert(amount).await
    }

    fn target_currency(&self) -> &str {
        self.inner.target_currency()
    }
}

struct BrokenConverter;

#[async_trait]
impl CurrencyConverter for BrokenConverter {
    async fn convert(&self, _amount: Decimal) -> Result<Decimal, ConversionError> {
        Err(ConversionError::Rejected("no rate for USD/PLN".into()))
    }

    fn target_currency(&self) -> &str {
        "PLN"
    }
}

#[derive(Default)]
struct RecordingPublisher {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, message: &str, destination: &str) -> Result<String, PublishError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((message.to_string(), destination.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

struct RejectingPublisher;

#[async_trait]
impl MessagePublisher for RejectingPublisher {
    async fn publish(&self, _message: &str, _destination: &str) -> Result<String, PublishError> {
        Err(PublishError::Status {
            status: 403,
            body: "AuthorizationError".into(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

const TOPIC: &str = "arn:aws:sns:eu-central-1:111122223333:income";

fn settings() -> Settings {
    settings_with(&[])
}

fn settings_with(overrides: &[(&'static str, &'static str)]) -> Settings {
    let mut env = HashMap::from([
        ("HARVEST_ACCOUNT_ID", "1"),
        ("HARVEST_ACCESS_TOKEN", "t"),
        ("HARVEST_CLIENT_ID", "2"),
        ("HOURLY_RATE", "50"),
        ("ESTIMATED_MONTHLY_FIXED_TAXES", "1000"),
        ("ESTIMATED_TAX_RATE", "0.2"),
        ("AWS_REGION", "eu-central-1"),
        ("SNS_TOPIC_ARN", TOPIC),
    ]);
    env.extend(overrides.iter().copied());
    Settings::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn full_run_publishes_one_summary() {
    let settings = settings();
    let source = StaticSource::new(&["40", "30.1", "29.9"]);
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    // Friday 2024-03-29; only the weekend is left, so nothing is projected
    let now = Utc.with_ymd_and_hms(2024, 3, 29, 9, 0, 0).unwrap();
    let report = Invocation::new(&settings, &source, &converter, &publisher)
        .run(now)
        .await
        .unwrap();

    assert_eq!(
        *source.requested.lock().unwrap(),
        Some((
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        ))
    );
    assert_eq!(report.hours.total_rounded_hours, d("100"));
    assert!(report.projected.hours.is_zero());
    assert_eq!(report.actual.gross_local, d("5000"));
    assert_eq!(report.actual.taxable_income, d("4000"));
    assert_eq!(report.actual.income_tax, d("800"));
    assert_eq!(report.actual.net_income, d("3200"));
    assert_eq!(report.potential, report.actual);
    assert_eq!(report.delivery_id, "msg-1");

    let sent = publisher.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].0,
        "Total Hours: 100.00\nEstimated Pay After Taxes 3,200.00 USD\nPotential Income: 3,200.00\n"
    );
    assert_eq!(sent[0].1, TOPIC);
    assert_eq!(converter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn potential_income_includes_projected_weekdays() {
    let settings = settings();
    let source = StaticSource::new(&["8"]);
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    // Friday 2024-03-22: Mon 25 - Fri 29 remain = 40h
    let now = Utc.with_ymd_and_hms(2024, 3, 22, 17, 0, 0).unwrap();
    let report = Invocation::new(&settings, &source, &converter, &publisher)
        .run(now)
        .await
        .unwrap();

    assert_eq!(report.projected.hours, d("40"));
    // 8h * 50 = 400 - 1000 = -600, no tax
    assert_eq!(report.actual.net_income, d("-600"));
    assert!(report.actual.income_tax.is_zero());
    // 48h * 50 = 2400 - 1000 = 1400, 20% tax
    assert_eq!(report.potential.net_income, d("1120"));

    let figures = report.summary.figures().unwrap();
    assert_eq!(figures.total_hours, d("8"));
    assert_eq!(figures.net_actual, d("-600"));
    assert_eq!(figures.net_potential, d("1120"));
}

#[tokio::test]
async fn empty_month_skips_conversion_for_actual_income() {
    let settings = settings();
    let source = StaticSource::new(&[]);
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    // Last day of the month: nothing logged, nothing left to project
    let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
    let report = Invocation::new(&settings, &source, &converter, &publisher)
        .run(now)
        .await
        .unwrap();

    assert!(report.actual.net_income.is_zero());
    assert!(report.potential.net_income.is_zero());
    assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        report.summary.text,
        "Total Hours: 0.00\nEstimated Pay After Taxes 0.00 USD\nPotential Income: 0.00\n"
    );
}

#[tokio::test]
async fn fetch_failure_aborts_before_publishing() {
    let settings = settings();
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let err = Invocation::new(&settings, &UnreachableSource, &converter, &publisher)
        .run(now)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Fetch(FetchError::Status { status: 503, .. })));
    assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    assert!(publisher.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn negative_entry_aborts_with_validation_error() {
    let settings = settings();
    let source = StaticSource::new(&["2", "-1"]);
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let err = Invocation::new(&settings, &source, &converter, &publisher)
        .run(now)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::NegativeHours { index: 1, .. })
    ));
    assert!(publisher.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn conversion_failure_is_fatal() {
    let settings = settings();
    let source = StaticSource::new(&["10"]);
    let publisher = RecordingPublisher::default();

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let err = Invocation::new(&settings, &source, &BrokenConverter, &publisher)
        .run(now)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Conversion(_)));
    assert!(err.to_string().contains("no rate for USD/PLN"));
    assert!(publisher.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn publish_failure_is_surfaced() {
    let settings = settings();
    let source = StaticSource::new(&["10"]);
    let converter = CountingConverter::identity();

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let err = Invocation::new(&settings, &source, &converter, &RejectingPublisher)
        .run(now)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Publish(PublishError::Status { status: 403, .. })));
}

#[tokio::test]
async fn oversized_rate_fails_without_publishing() {
    let settings = settings_with(&[("HOURLY_RATE", "79228162514264337593543950335")]);
    let source = StaticSource::new(&["2"]);
    let converter = CountingConverter::identity();
    let publisher = RecordingPublisher::default();

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let err = Invocation::new(&settings, &source, &converter, &publisher)
        .run(now)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::Overflow { .. })
    ));
    assert!(err.to_string().contains("out of range"));
    assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    assert!(publisher.sent.lock().unwrap().is_empty());
}
