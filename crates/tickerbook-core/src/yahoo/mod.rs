//! Yahoo-style provider client.
//!
//! [`YahooClient`] knows the provider's URLs and response envelopes. Every
//! body goes through the run's [`PageCache`], so categories that share a page
//! or a module set fetch it once.
//!
//! | Call | URL |
//! |------|-----|
//! | [`YahooClient::chart`] | `query1 /v8/finance/chart/{symbol}` |
//! | [`YahooClient::quote_summary`] | `query2 /v10/finance/quoteSummary/{symbol}?modules=` |
//! | [`YahooClient::esg_chart`] | `query2 /v1/finance/esgChart?symbol=` |
//! | [`YahooClient::recommendations`] | `query2 /v6/finance/recommendationsbysymbol/{symbol}` |
//! | [`YahooClient::page`] | `finance.yahoo.com/quote/{symbol}/{page}` |

pub mod auth;
pub mod wire;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::PageCache;
use crate::config::AggregatorConfig;
use crate::http_client::{HttpClient, HttpRequest};
use crate::source_error::SourceError;

pub use auth::CrumbManager;
pub use wire::{ChartResult, EsgChartResult, EsgScores, RawNumber};

/// Modules backing company summary, profile and statistics.
pub const INFO_MODULES: &[&str] = &[
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "assetProfile",
    "calendarEvents",
];

/// Modules backing the three financial statements.
pub const STATEMENT_MODULES: &[&str] = &[
    "incomeStatementHistory",
    "balanceSheetHistory",
    "cashflowStatementHistory",
    "earnings",
];

/// Module backing ESG and sustainability fallbacks.
pub const ESG_MODULES: &[&str] = &["esgScores"];

/// Modules fetched for each peer row.
pub const PEER_MODULES: &[&str] = &["price", "esgScores"];

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_BASE: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const ESG_CHART_BASE: &str = "https://query2.finance.yahoo.com/v1/finance/esgChart";
const RECOMMENDATIONS_BASE: &str =
    "https://query2.finance.yahoo.com/v6/finance/recommendationsbysymbol";
const PAGE_BASE: &str = "https://finance.yahoo.com/quote";

/// Rendered provider pages scraped by the fallback tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Quote,
    KeyStatistics,
    Analysis,
    Financials,
    BalanceSheet,
    CashFlow,
    Sustainability,
    Profile,
    History,
}

impl Page {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Quote => "",
            Self::KeyStatistics => "key-statistics",
            Self::Analysis => "analysis",
            Self::Financials => "financials",
            Self::BalanceSheet => "balance-sheet",
            Self::CashFlow => "cash-flow",
            Self::Sustainability => "sustainability",
            Self::Profile => "profile",
            Self::History => "history",
        }
    }

    pub fn url(self, symbol: &str) -> String {
        let encoded = urlencoding::encode(symbol);
        match self {
            Self::Quote => format!("{PAGE_BASE}/{encoded}"),
            _ => format!("{PAGE_BASE}/{encoded}/{}", self.path()),
        }
    }
}

/// Time window for a chart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartWindow {
    /// Explicit epoch-second bounds.
    Between { period1: i64, period2: i64 },
    /// The last five sessions.
    RecentDays,
}

pub fn chart_url(symbol: &str, window: ChartWindow) -> String {
    let encoded = urlencoding::encode(symbol);
    match window {
        ChartWindow::Between { period1, period2 } => format!(
            "{CHART_BASE}/{encoded}?period1={period1}&period2={period2}&interval=1d&includePrePost=false"
        ),
        ChartWindow::RecentDays => format!("{CHART_BASE}/{encoded}?range=5d&interval=1d"),
    }
}

pub fn quote_summary_url(symbol: &str, modules: &[&str]) -> String {
    format!(
        "{QUOTE_SUMMARY_BASE}/{}?modules={}",
        urlencoding::encode(symbol),
        urlencoding::encode(&modules.join(","))
    )
}

pub fn esg_chart_url(symbol: &str) -> String {
    format!("{ESG_CHART_BASE}?symbol={}", urlencoding::encode(symbol))
}

pub fn recommendations_url(symbol: &str) -> String {
    format!("{RECOMMENDATIONS_BASE}/{}", urlencoding::encode(symbol))
}

/// Provider client bound to one run's cache.
#[derive(Clone)]
pub struct YahooClient {
    http: Arc<dyn HttpClient>,
    crumbs: CrumbManager,
    cache: PageCache,
    api_timeout_ms: u64,
    page_timeout_ms: u64,
}

impl YahooClient {
    pub fn new(http: Arc<dyn HttpClient>, cache: PageCache, config: &AggregatorConfig) -> Self {
        Self {
            http,
            crumbs: CrumbManager::new(),
            cache,
            api_timeout_ms: config.api_timeout_ms,
            page_timeout_ms: config.page_timeout_ms,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Rendered page body.
    pub async fn page(&self, symbol: &str, page: Page) -> Result<Arc<str>, SourceError> {
        let url = page.url(symbol);
        self.cache
            .get_or_fetch(&url, || async {
                let request = HttpRequest::get(url.as_str())
                    .with_browser_headers()
                    .with_timeout_ms(self.page_timeout_ms);
                let response = self.http.execute(request).await?;
                if !response.is_success() {
                    return Err(SourceError::status(response.status, &url));
                }
                debug!(url = %url, bytes = response.body.len(), "fetched page");
                Ok(response.body)
            })
            .await
    }

    /// JSON endpoint body, with the crumb appended when one is available.
    /// Cached under the URL without the crumb.
    pub async fn json(&self, url: &str) -> Result<Arc<str>, SourceError> {
        self.cache
            .get_or_fetch(url, || async {
                let (request_url, with_crumb) = match self.crumbs.crumb(self.http.as_ref(), self.api_timeout_ms).await {
                    Ok(crumb) => {
                        let separator = if url.contains('?') { '&' } else { '?' };
                        (format!("{url}{separator}crumb={}", urlencoding::encode(&crumb)), true)
                    }
                    Err(error) => {
                        debug!(url, error = %error, "continuing without crumb");
                        (url.to_string(), false)
                    }
                };

                let request = HttpRequest::get(request_url)
                    .with_browser_headers()
                    .with_header("accept", "application/json")
                    .with_timeout_ms(self.api_timeout_ms);
                let response = self.http.execute(request).await?;
                if with_crumb && (response.status == 401 || response.status == 403) {
                    self.crumbs.invalidate().await;
                }
                if !response.is_success() {
                    return Err(SourceError::status(response.status, url));
                }
                Ok(response.body)
            })
            .await
    }

    pub async fn chart(&self, symbol: &str, window: ChartWindow) -> Result<ChartResult, SourceError> {
        let body = self.json(&chart_url(symbol, window)).await?;
        let response: wire::ChartResponse = serde_json::from_str(&body)?;

        if let Some(error) = response.chart.error.filter(|error| !error.is_null()) {
            return Err(SourceError::absent(format!("chart API error: {error}")));
        }

        response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| SourceError::absent("no chart data in response"))
    }

    /// First `quoteSummary.result` object for the requested modules.
    pub async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value, SourceError> {
        let body = self.json(&quote_summary_url(symbol, modules)).await?;
        let response: Value = serde_json::from_str(&body)?;

        if let Some(error) = response
            .pointer("/quoteSummary/error")
            .filter(|error| !error.is_null())
        {
            return Err(SourceError::absent(format!("quoteSummary error: {error}")));
        }

        response
            .pointer("/quoteSummary/result/0")
            .filter(|result| result.is_object())
            .cloned()
            .ok_or_else(|| SourceError::absent("quoteSummary returned no result"))
    }

    pub async fn esg_chart(&self, symbol: &str) -> Result<EsgChartResult, SourceError> {
        let body = self.json(&esg_chart_url(symbol)).await?;
        let response: wire::EsgChartResponse = serde_json::from_str(&body)?;
        response
            .esg_chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::absent("esgChart returned no result"))
    }

    /// Recommended comparable tickers, in provider order.
    pub async fn recommendations(&self, symbol: &str) -> Result<Vec<String>, SourceError> {
        let body = self.json(&recommendations_url(symbol)).await?;
        let response: wire::RecommendationsResponse = serde_json::from_str(&body)?;
        let symbols: Vec<String> = response
            .finance
            .result
            .into_iter()
            .flat_map(|result| result.recommended_symbols)
            .map(|recommended| recommended.symbol)
            .collect();

        if symbols.is_empty() {
            return Err(SourceError::absent("no recommended symbols"));
        }
        Ok(symbols)
    }
}
