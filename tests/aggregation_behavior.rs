//! Behavior tests for end-to-end aggregation runs.
//!
//! A routing HTTP mock stands in for the provider; each test states which
//! endpoints answer and checks how every category resolves.

use std::sync::Arc;

use tickerbook_core::{
    Aggregator, AggregatorConfig, Category, CategoryReport, CoreError, FetchOutcome, SinkError,
    SourceTier, Symbol,
};
use tickerbook_tests::{
    today, RoutingHttpClient, CHART_HISTORY, ESG_CHART, RECOMMENDATIONS, STATEMENT_MODULES,
};

fn aapl_provider() -> RoutingHttpClient {
    RoutingHttpClient::new()
        .status("quote/AAPL/financials", 500)
        .route("v8/finance/chart/AAPL?period1", CHART_HISTORY)
        .route("esgChart?symbol=AAPL", ESG_CHART)
        .route("quoteSummary/AAPL?modules=incomeStatementHistory", STATEMENT_MODULES)
}

// =============================================================================
// Aggregation: tier selection across categories
// =============================================================================

#[tokio::test]
async fn when_financials_page_fails_income_statement_comes_from_library_tier() {
    // Given: The financials page errors while chart, ESG and modules answer
    let http = Arc::new(aapl_provider());
    let aggregator = Aggregator::new(http, AggregatorConfig::default());

    // When: A full run is performed for AAPL
    let bundle = aggregator
        .run_on(&Symbol::parse("AAPL").expect("valid"), today())
        .await;

    // Then: Income comes from the library tier with formatted magnitudes
    let income = bundle.get(Category::IncomeStatement).expect("income report");
    assert_eq!(income.tier(), Some(SourceTier::Library));
    let CategoryReport::Statement(_, FetchOutcome::Success(fetched)) = income else {
        panic!("income statement should be available");
    };
    assert_eq!(fetched.data.dates, vec!["30-09-2023", "30-09-2022"]);
    assert_eq!(fetched.data.rows[0].label, "Revenue");
    assert_eq!(fetched.data.rows[0].cells, vec!["383.29B", "394.33B"]);
    assert!(fetched.data.is_aligned());
    assert_eq!(fetched.warnings.len(), 1, "fallback after failed page tiers is reported");

    // And: History and ESG are served by their API tier
    assert_eq!(
        bundle.get(Category::HistoricalData).and_then(CategoryReport::tier),
        Some(SourceTier::Api)
    );
    assert_eq!(
        bundle.get(Category::EsgScores).and_then(CategoryReport::tier),
        Some(SourceTier::Api)
    );
}

#[tokio::test]
async fn bundle_order_does_not_depend_on_worker_count() {
    // Given: The same provider served through one worker and through eight
    let symbol = Symbol::parse("AAPL").expect("valid");
    let single = Aggregator::new(
        Arc::new(aapl_provider()),
        AggregatorConfig::default().with_worker_count(1),
    );
    let wide = Aggregator::new(
        Arc::new(aapl_provider()),
        AggregatorConfig::default().with_worker_count(8),
    );

    // When: Both run
    let first = single.run_on(&symbol, today()).await;
    let second = wide.run_on(&symbol, today()).await;

    // Then: Reports follow category rank and agree on availability
    let order = |bundle: &tickerbook_core::ReportBundle| -> Vec<Category> {
        bundle.reports().iter().map(CategoryReport::category).collect()
    };
    assert_eq!(order(&first), Category::ALL.to_vec());
    assert_eq!(order(&second), Category::ALL.to_vec());
    assert_eq!(first.unavailable_categories(), second.unavailable_categories());
}

// =============================================================================
// Aggregation: missing data
// =============================================================================

#[tokio::test]
async fn when_no_esg_exists_anywhere_category_is_unavailable_and_run_still_writes() {
    // Given: A ticker with price history but no ESG source at all
    let temp = tempfile::tempdir().expect("temp dir");
    let http = Arc::new(
        RoutingHttpClient::new().route("v8/finance/chart/ZZZZ?period1", CHART_HISTORY),
    );
    let config = AggregatorConfig::default().with_output_dir(temp.path());
    let aggregator = Aggregator::new(http, config);

    // When: The run writes its workbook
    let (path, bundle) = aggregator
        .run_to_file(&Symbol::parse("zzzz").expect("valid"))
        .await
        .expect("run completes despite missing categories");

    // Then: ESG is unavailable with an explanation and the workbook exists
    assert_eq!(path, temp.path().join("ZZZZ.xlsx"));
    assert!(path.is_file());
    let esg = bundle.get(Category::EsgScores).expect("esg report");
    let details = esg.unavailable_details().expect("esg unavailable");
    assert_eq!(details.reason, "no ESG data published for ZZZZ");
    assert_eq!(details.attempts.len(), 4);
    assert!(bundle.get(Category::HistoricalData).is_some_and(CategoryReport::is_success));
}

#[tokio::test]
async fn peer_set_keeps_subject_first_without_derivatives_or_duplicates() {
    // Given: Page peers that repeat the subject, an index, a future and a duplicate
    let html = r#"
        <section>
          <h3>ESG Risk Score for Peers</h3>
          <table>
            <tr><td><a href="/quote/AAPL">Apple Inc.</a></td><td>16.9</td><td>0.6</td><td>7.3</td><td>9.0</td></tr>
            <tr><td><a href="/quote/MSFT">Microsoft Corporation</a></td><td>17.2</td><td>0.5</td><td>7.4</td><td>9.3</td></tr>
            <tr><td><a href="/quote/%5EIXIC">NASDAQ Composite</a></td><td>20.1</td><td>1</td><td>2</td><td>3</td></tr>
            <tr><td><a href="/quote/NQ=F">Nasdaq 100 Futures</a></td><td>20.1</td><td>1</td><td>2</td><td>3</td></tr>
            <tr><td><a href="/quote/msft">Microsoft again</a></td><td>17.2</td><td>0.5</td><td>7.4</td><td>9.3</td></tr>
            <tr><td><a href="/quote/DELL">Dell Technologies</a></td><td>13.2</td><td>1.1</td><td>6.2</td><td>5.9</td></tr>
          </table>
        </section>"#;
    let http = Arc::new(
        RoutingHttpClient::new()
            .route("quote/AAPL/sustainability", html)
            .route("recommendationsbysymbol/AAPL", RECOMMENDATIONS),
    );
    let aggregator = Aggregator::new(http, AggregatorConfig::default());

    // When: A run completes
    let bundle = aggregator
        .run_on(&Symbol::parse("AAPL").expect("valid"), today())
        .await;

    // Then: The page tier wins and the set honours every invariant
    let peers = bundle.get(Category::Peers).expect("peers report");
    assert_eq!(peers.tier(), Some(SourceTier::HtmlTable));
    let CategoryReport::Peers(FetchOutcome::Success(fetched)) = peers else {
        panic!("peers should be available");
    };
    let tickers: Vec<String> = fetched
        .data
        .entries()
        .iter()
        .map(|entry| entry.ticker.to_ascii_uppercase())
        .collect();
    assert_eq!(tickers, vec!["AAPL", "MSFT", "DELL"]);
    assert!(tickers.iter().all(|ticker| !ticker.contains('^') && !ticker.contains('=')));
}

// =============================================================================
// Aggregation: output sink
// =============================================================================

#[tokio::test]
async fn when_output_path_is_blocked_run_aborts_before_any_request() {
    // Given: A directory sits where the workbook should be written
    let temp = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(temp.path().join("AAPL.xlsx")).expect("blocking directory");
    let http = Arc::new(aapl_provider());
    let aggregator = Aggregator::new(
        Arc::clone(&http) as Arc<dyn tickerbook_core::HttpClient>,
        AggregatorConfig::default().with_output_dir(temp.path()),
    );

    // When: The run starts
    let result = aggregator
        .run_to_file(&Symbol::parse("AAPL").expect("valid"))
        .await;

    // Then: It fails with a sink error and the provider was never contacted
    let error = result.expect_err("blocked sink");
    assert!(matches!(error, CoreError::Sink(SinkError::Io { .. })));
    assert!(http.requests().is_empty());
}
