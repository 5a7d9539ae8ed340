//! Run orchestration.
//!
//! Order-sensitive categories (history, ESG, summary, statistics) run one
//! after another. The independent ones (the three statements as a single
//! task, sustainability, peers) are spawned onto the runtime and gated by a
//! semaphore sized to [`AggregatorConfig::worker_count`]. Reports are sorted
//! by category rank after every task has finished, so the output never
//! depends on completion order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::PageCache;
use crate::categories::{
    esg, history, peers, statements, statistics, summary, sustainability, Category, CategoryReport,
    FetchContext,
};
use crate::config::AggregatorConfig;
use crate::domain::{CalendarDate, Symbol};
use crate::error::CoreError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::yahoo::YahooClient;
use crate::{report, sink};

/// Every category outcome of one run, in sheet order.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    symbol: Symbol,
    generated_on: CalendarDate,
    reports: Vec<CategoryReport>,
}

impl ReportBundle {
    /// Sorts `reports` by rank. A category missing from `reports` gets an
    /// `Unavailable` placeholder so the bundle always covers all nine.
    pub fn new(symbol: Symbol, generated_on: CalendarDate, mut reports: Vec<CategoryReport>) -> Self {
        for category in Category::ALL {
            if !reports.iter().any(|report| report.category() == category) {
                reports.push(CategoryReport::unavailable(category, "category was not collected"));
            }
        }
        reports.sort_by_key(|report| report.category().rank());
        reports.dedup_by_key(|report| report.category());
        Self {
            symbol,
            generated_on,
            reports,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn generated_on(&self) -> CalendarDate {
        self.generated_on
    }

    pub fn reports(&self) -> &[CategoryReport] {
        &self.reports
    }

    pub fn get(&self, category: Category) -> Option<&CategoryReport> {
        self.reports.iter().find(|report| report.category() == category)
    }

    pub fn available_count(&self) -> usize {
        self.reports.iter().filter(|report| report.is_success()).count()
    }

    pub fn unavailable_categories(&self) -> Vec<Category> {
        self.reports
            .iter()
            .filter(|report| !report.is_success())
            .map(CategoryReport::category)
            .collect()
    }
}

/// Collects all categories for a ticker and writes the workbook.
pub struct Aggregator {
    http: Arc<dyn HttpClient>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(http: Arc<dyn HttpClient>, config: AggregatorConfig) -> Self {
        Self { http, config }
    }

    /// Aggregator backed by a real `reqwest` client.
    pub fn with_default_client(config: AggregatorConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Checks the output sink, runs every category, then writes
    /// `<output_dir>/<TICKER>.xlsx`.
    ///
    /// A locked sink aborts before any network traffic. Category failures
    /// never abort; they become explanatory sheets.
    pub async fn run_to_file(&self, symbol: &Symbol) -> Result<(PathBuf, ReportBundle), CoreError> {
        self.config.validate()?;
        let path = sink::preflight(&self.config.output_dir, symbol)?;
        let bundle = self.run(symbol).await;
        report::write_workbook(&bundle, &path)?;
        info!(
            symbol = %symbol,
            path = %path.display(),
            available = bundle.available_count(),
            "workbook written"
        );
        Ok((path, bundle))
    }

    pub async fn run(&self, symbol: &Symbol) -> ReportBundle {
        self.run_on(symbol, CalendarDate::today()).await
    }

    /// Same as [`run`](Self::run) with an explicit "today" for date-derived
    /// estimates.
    pub async fn run_on(&self, symbol: &Symbol, today: CalendarDate) -> ReportBundle {
        let started = Instant::now();
        let client = YahooClient::new(Arc::clone(&self.http), PageCache::new(), &self.config);
        let ctx = Arc::new(FetchContext::new(client, symbol.clone(), self.config.clone(), today));

        info!(symbol = %symbol, workers = self.config.worker_count, "aggregation started");

        let mut reports = Vec::with_capacity(Category::ALL.len());
        reports.push(CategoryReport::History(history::fetch(&ctx).await));
        reports.push(CategoryReport::Esg(esg::fetch(&ctx).await));
        reports.push(CategoryReport::Summary(summary::fetch(&ctx).await));
        reports.push(CategoryReport::Statistics(statistics::fetch(&ctx).await));

        let pool = Arc::new(Semaphore::new(self.config.worker_count.max(1)));
        let tasks: Vec<(Vec<Category>, JoinHandle<Vec<CategoryReport>>)> = vec![
            (
                vec![Category::IncomeStatement, Category::BalanceSheet, Category::CashFlow],
                spawn_pooled(&pool, &ctx, |ctx| async move { statements::fetch_all(&ctx).await }),
            ),
            (
                vec![Category::Sustainability],
                spawn_pooled(&pool, &ctx, |ctx| async move {
                    vec![CategoryReport::Sustainability(sustainability::fetch(&ctx).await)]
                }),
            ),
            (
                vec![Category::Peers],
                spawn_pooled(&pool, &ctx, |ctx| async move {
                    vec![CategoryReport::Peers(peers::fetch(&ctx).await)]
                }),
            ),
        ];

        for (categories, handle) in tasks {
            match handle.await {
                Ok(task_reports) => reports.extend(task_reports),
                Err(error) => {
                    warn!(symbol = %symbol, error = %error, "worker task failed");
                    reports.extend(categories.into_iter().map(|category| {
                        CategoryReport::unavailable(category, format!("worker task failed: {error}"))
                    }));
                }
            }
        }

        let bundle = ReportBundle::new(symbol.clone(), today, reports);
        info!(
            symbol = %symbol,
            available = bundle.available_count(),
            unavailable = bundle.unavailable_categories().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );
        bundle
    }
}

/// Spawns `task` to run once a pool permit is free. A closed pool returns no
/// reports and the bundle marks those categories as not collected.
fn spawn_pooled<F, Fut>(
    pool: &Arc<Semaphore>,
    ctx: &Arc<FetchContext>,
    task: F,
) -> JoinHandle<Vec<CategoryReport>>
where
    F: FnOnce(Arc<FetchContext>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Vec<CategoryReport>> + Send + 'static,
{
    let pool = Arc::clone(pool);
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let _permit = match pool.acquire_owned().await {
            Ok(permit) => permit,
            Err(error) => {
                warn!(error = %error, "worker pool closed before task start");
                return Vec::new();
            }
        };
        task(ctx).await
    })
}
