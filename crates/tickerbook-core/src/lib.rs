//! # Tickerbook Core
//!
//! Collects nine categories of data for one ticker from Yahoo-style
//! endpoints and pages and writes them to a single xlsx workbook.
//!
//! ## Overview
//!
//! Every category is fetched through a [`FallbackChain`]: an ordered list of
//! source tiers (JSON API, embedded page JSON, HTML tables, library-style
//! endpoints) tried until one yields usable data. A category that exhausts
//! its chain becomes [`FetchOutcome::Unavailable`] and still gets a sheet
//! that explains what went wrong. Values that were estimated rather than
//! observed carry a visible marker.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Run orchestration and the [`ReportBundle`] |
//! | [`cache`] | Per-run page cache shared by all categories |
//! | [`categories`] | One fetcher per workbook sheet |
//! | [`config`] | Timeouts, worker count, output directory |
//! | [`domain`] | Typed models with provenance tags |
//! | [`error`] | Run-level error types |
//! | [`fallback`] | Tiered fetch chain and attempt log |
//! | [`format`] | Display formatting for numbers |
//! | [`http_client`] | HTTP client abstraction |
//! | [`report`] | Sheet layout and xlsx rendering |
//! | [`scrape`] | HTML and embedded-JSON extraction |
//! | [`sink`] | Output path checks |
//! | [`source_error`] | Per-attempt source errors |
//! | [`yahoo`] | Endpoint URLs, crumb handling, wire types |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickerbook_core::{Aggregator, AggregatorConfig, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AggregatorConfig::from_env()?;
//!     let aggregator = Aggregator::with_default_client(config);
//!
//!     let (path, bundle) = aggregator.run_to_file(&Symbol::parse("AAPL")?).await?;
//!     println!("{} sheets with data in {}", bundle.available_count(), path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Aggregator     │────▶│ Output Sink      │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Category Chains │────▶│ Yahoo Client     │
//! │ (FallbackChain) │     │ + PageCache      │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Report Layout   │
//! │ (xlsx workbook) │
//! └─────────────────┘
//! ```

pub mod aggregator;
pub mod cache;
pub mod categories;
pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod format;
pub mod http_client;
pub mod report;
pub mod scrape;
pub mod sink;
pub mod source_error;
pub mod yahoo;

// Orchestration
pub use aggregator::{Aggregator, ReportBundle};

// Categories
pub use categories::{Category, CategoryReport};

// Configuration
pub use config::AggregatorConfig;

// Domain models
pub use domain::{
    CalendarDate, CompanySummary, EsgReport, KeyStatistics, PeerSet, PriceSeries, Provenance,
    Sourced, StatementKind, StatementTable, SustainabilityReport, Symbol,
};

// Error types
pub use error::{CoreError, ValidationError};
pub use report::ReportError;
pub use sink::SinkError;
pub use source_error::{SourceError, SourceErrorKind};

// Fallback chain
pub use fallback::{FallbackChain, FetchOutcome, Fetched, SourceTier, Unavailable};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
