//! One-shot collect-and-summarize run for a ticker.
//!
//! Usage: `ticker-sentiment <TICKER> [DAYS]` — collects from every source,
//! stores new records and prints the JSON sentiment summary. Scheduling is
//! an external concern (cron or a timer loop around this binary).

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ticker_sentiment=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op where the env comes from the host.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(ticker) = args.next() else {
        bail!("usage: ticker-sentiment <TICKER> [DAYS]");
    };
    let days: i64 = match args.next() {
        Some(d) => d.parse().context("DAYS must be an integer")?,
        None => 7,
    };

    // A store that cannot be opened is fatal for the run, but the caller
    // still gets a well-formed (zeroed) summary with the error attached.
    let summary = match ticker_sentiment::default_aggregator() {
        Ok(aggregator) => aggregator.summarize(&ticker, days).await,
        Err(e) => {
            tracing::error!(error = %e, "aggregator setup failed");
            ticker_sentiment::SentimentSummary::degraded(&ticker, days, e.to_string())
        }
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
