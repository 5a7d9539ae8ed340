//! CLI argument definitions for tickerbook.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `TICKER` | prompt (`AAPL`) | Symbol to collect |
//! | `--output-dir` | `Datasets` | Directory receiving `<TICKER>.xlsx` |
//! | `--timeout-ms` | `10000` | JSON endpoint timeout |
//! | `--page-timeout-ms` | `15000` | Rendered page timeout |
//! | `--workers` | `3` | Concurrent category workers |
//! | `--lookback-years` | `5` | Historical price window |
//! | `--log-level` | `RUST_LOG` | Log filter directive |
//!
//! Unset flags fall back to `TICKERBOOK_*` environment variables, then to
//! the defaults above.
//!
//! # Examples
//!
//! ```bash
//! tickerbook AAPL
//! tickerbook MSFT --output-dir reports --workers 4
//! RUST_LOG=tickerbook_core=debug tickerbook KO
//! ```

use std::path::PathBuf;

use clap::Parser;
use tickerbook_core::{AggregatorConfig, ValidationError};

/// Collect ticker fundamentals into one xlsx workbook.
///
/// Writes price history, ESG scores, a company summary, key statistics, the
/// three financial statements, sustainability details and an ESG peer
/// comparison. Categories that cannot be fetched get an explanatory sheet.
#[derive(Debug, Parser)]
#[command(name = "tickerbook", author, version, about = "Collect ticker fundamentals into an xlsx workbook")]
pub struct Cli {
    /// Ticker symbol, e.g. AAPL. Prompted for when omitted.
    pub ticker: Option<String>,

    /// Directory that receives `<TICKER>.xlsx`.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Timeout for JSON endpoints in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Timeout for rendered pages in milliseconds.
    #[arg(long)]
    pub page_timeout_ms: Option<u64>,

    /// Number of categories fetched concurrently.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Years of daily price history.
    #[arg(long)]
    pub lookback_years: Option<u32>,

    /// Log filter, e.g. `debug` or `tickerbook_core=trace`. Overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Layers explicit flags over `base` and validates the result.
    pub fn resolve_config(&self, base: AggregatorConfig) -> Result<AggregatorConfig, ValidationError> {
        let mut config = base;
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_api_timeout_ms(timeout_ms);
        }
        if let Some(timeout_ms) = self.page_timeout_ms {
            config = config.with_page_timeout_ms(timeout_ms);
        }
        if let Some(workers) = self.workers {
            config = config.with_worker_count(workers);
        }
        if let Some(years) = self.lookback_years {
            config = config.with_lookback_years(years);
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_base_config() {
        let cli = Cli::parse_from(["tickerbook", "msft", "--workers", "5", "--output-dir", "out"]);

        let config = cli.resolve_config(AggregatorConfig::default()).expect("valid config");

        assert_eq!(cli.ticker.as_deref(), Some("msft"));
        assert_eq!(config.worker_count, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.api_timeout_ms, AggregatorConfig::default().api_timeout_ms);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let cli = Cli::parse_from(["tickerbook", "--timeout-ms", "10"]);

        let error = cli
            .resolve_config(AggregatorConfig::default())
            .expect_err("timeout below minimum");

        assert!(matches!(error, ValidationError::OutOfRange { .. }));
        assert!(cli.ticker.is_none());
    }
}
