//! Run configuration.
//!
//! Values resolve in three layers: built-in defaults, then `TICKERBOOK_*`
//! environment variables via [`AggregatorConfig::from_env`], then explicit
//! overrides applied by the caller (the CLI flags).
//!
//! | Variable | Default | Range |
//! |----------|---------|-------|
//! | `TICKERBOOK_TIMEOUT_MS` | `10000` | 1000–60000 |
//! | `TICKERBOOK_PAGE_TIMEOUT_MS` | `15000` | 1000–60000 |
//! | `TICKERBOOK_WORKERS` | `3` | 1–16 |
//! | `TICKERBOOK_LOOKBACK_YEARS` | `5` | 1–30 |
//! | `TICKERBOOK_OUTPUT_DIR` | `Datasets` | non-empty |

use std::env;
use std::path::PathBuf;

use crate::ValidationError;

const TIMEOUT_RANGE: (u64, u64) = (1_000, 60_000);
const WORKER_RANGE: (u64, u64) = (1, 16);
const LOOKBACK_RANGE: (u64, u64) = (1, 30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Timeout for JSON endpoints.
    pub api_timeout_ms: u64,
    /// Timeout for rendered pages.
    pub page_timeout_ms: u64,
    /// Size of the pool running independent categories.
    pub worker_count: usize,
    pub lookback_years: u32,
    pub output_dir: PathBuf,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_timeout_ms: 10_000,
            page_timeout_ms: 15_000,
            worker_count: 3,
            lookback_years: 5,
            output_dir: PathBuf::from("Datasets"),
        }
    }
}

impl AggregatorConfig {
    /// Defaults overlaid with `TICKERBOOK_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(value) = lookup("TICKERBOOK_TIMEOUT_MS") {
            config.api_timeout_ms = parse_number("TICKERBOOK_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("TICKERBOOK_PAGE_TIMEOUT_MS") {
            config.page_timeout_ms = parse_number("TICKERBOOK_PAGE_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("TICKERBOOK_WORKERS") {
            config.worker_count = parse_number("TICKERBOOK_WORKERS", &value)? as usize;
        }
        if let Some(value) = lookup("TICKERBOOK_LOOKBACK_YEARS") {
            config.lookback_years = parse_number("TICKERBOOK_LOOKBACK_YEARS", &value)? as u32;
        }
        if let Some(value) = lookup("TICKERBOOK_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(value);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.api_timeout_ms = timeout_ms;
        self
    }

    pub fn with_page_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.page_timeout_ms = timeout_ms;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = years;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("api timeout (ms)", self.api_timeout_ms, TIMEOUT_RANGE)?;
        check_range("page timeout (ms)", self.page_timeout_ms, TIMEOUT_RANGE)?;
        check_range("worker count", self.worker_count as u64, WORKER_RANGE)?;
        check_range("lookback years", u64::from(self.lookback_years), LOOKBACK_RANGE)?;
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyOutputDir);
        }
        Ok(())
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u64, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })
}

fn check_range(field: &'static str, value: u64, (min, max): (u64, u64)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
