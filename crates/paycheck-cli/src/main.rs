use chrono::{DateTime, FixedOffset, Local};
use clap::Parser;
use paycheck_core::{run_once, CoreError, Settings};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "paycheck",
    version,
    about = "Publish this month's hours and estimated income"
)]
struct Cli {
    /// Treat this RFC 3339 timestamp as "now" instead of the local clock
    #[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
    at: Option<DateTime<FixedOffset>>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn invoke(now: DateTime<FixedOffset>) -> Result<String, CoreError> {
    let settings = Settings::from_env()?;
    let report = run_once(&settings, now).await?;
    tracing::info!(message_id = %report.delivery_id, "invocation complete");
    Ok(report.summary.text)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let now = cli.at.unwrap_or_else(|| Local::now().into());
    match invoke(now).await {
        Ok(summary) => print!("{summary}"),
        Err(e) => {
            tracing::error!(error = %e, "invocation failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
