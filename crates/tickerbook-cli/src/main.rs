mod cli;
mod error;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tickerbook_core::{Aggregator, AggregatorConfig, Category, Symbol};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

const DEFAULT_TICKER: &str = "AAPL";
const DEFAULT_LOG_FILTER: &str = "tickerbook=info,tickerbook_core=info,warn";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = cli.resolve_config(AggregatorConfig::from_env()?)?;
    debug!(?config, "resolved configuration");
    let ticker = match &cli.ticker {
        Some(ticker) => ticker.clone(),
        None => prompt_ticker()?,
    };
    let symbol = Symbol::parse(&ticker)?;

    let aggregator = Aggregator::with_default_client(config);
    let (path, bundle) = aggregator.run_to_file(&symbol).await?;

    let unavailable = bundle.unavailable_categories();
    println!(
        "Saved {} ({} of {} sheets with data)",
        path.display(),
        bundle.available_count(),
        Category::ALL.len()
    );
    if !unavailable.is_empty() {
        let names: Vec<&str> = unavailable.iter().map(|category| category.sheet_name()).collect();
        println!("Unavailable: {}", names.join(", "));
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout only carries the run summary.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn prompt_ticker() -> Result<String, CliError> {
    print!("Enter ticker symbol [{DEFAULT_TICKER}]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(String::from(DEFAULT_TICKER));
    }
    Ok(trimmed.to_string())
}
