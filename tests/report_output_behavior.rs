//! Behavior tests for workbook layout and output.
//!
//! Bundles are assembled directly from domain values so each test controls
//! exactly which categories are available.

use tickerbook_core::domain::{
    ControversyLevel, EsgComponents, EsgObservation, PeerEsgEntry, PriceBar,
};
use tickerbook_core::fallback::AttemptLog;
use tickerbook_core::report::{self, layout, CellStyle, CellValue};
use tickerbook_core::{
    Category, CategoryReport, EsgReport, FetchOutcome, PeerSet, PriceSeries, ReportBundle,
    SourceTier, StatementKind, StatementTable, SustainabilityReport, Symbol,
};
use tickerbook_tests::today;

fn success<T>(data: T, tier: SourceTier) -> FetchOutcome<T> {
    AttemptLog::new("test").succeed(data, tier, "fixture")
}

fn bundle(reports: Vec<CategoryReport>) -> ReportBundle {
    ReportBundle::new(Symbol::parse("AAPL").expect("valid"), today(), reports)
}

fn price_series() -> PriceSeries {
    let bar = |day: u8, close: f64| PriceBar {
        date: tickerbook_core::CalendarDate::from_ymd(2024, 1, day).expect("date"),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: Some(1_000_000.0),
    };
    PriceSeries::from_bars(vec![bar(3, 184.25), bar(4, 181.91)])
}

// =============================================================================
// Report Output: sheet order
// =============================================================================

#[test]
fn sheets_follow_category_rank_whatever_order_reports_arrive_in() {
    // Given: Reports handed over in reverse completion order
    let reports = vec![
        CategoryReport::unavailable(Category::Peers, "no comparable tickers published"),
        CategoryReport::Statement(
            StatementKind::CashFlow,
            FetchOutcome::unavailable("all sources failed"),
        ),
        CategoryReport::History(success(price_series(), SourceTier::Api)),
    ];

    // When: The bundle is laid out
    let sheets = layout::layout(&bundle(reports));

    // Then: The sheet names follow the fixed workbook order
    let names: Vec<&str> = sheets.iter().map(|sheet| sheet.name).collect();
    assert_eq!(
        names,
        vec![
            "Historical Data",
            "ESG Scores",
            "Company Summary",
            "Statistics",
            "Income Statement",
            "Balance Sheet",
            "Cash Flow",
            "Sustainability",
            "Peers",
        ]
    );
    assert_eq!(sheets[0].rows[1].texts()[0], "04-01-2024");
}

// =============================================================================
// Report Output: unavailable and estimated data
// =============================================================================

#[test]
fn unavailable_esg_sheet_explains_instead_of_fabricating_scores() {
    // Given: ESG could not be fetched from any tier
    let reports = vec![CategoryReport::unavailable(
        Category::EsgScores,
        "no ESG data published for AAPL",
    )];

    // When: The bundle is laid out
    let sheets = layout::layout(&bundle(reports));

    // Then: The ESG sheet holds one error header and one message, no numbers
    let esg = &sheets[Category::EsgScores.rank()];
    assert_eq!(esg.rows.len(), 2);
    assert_eq!(esg.rows[0].cells[0].style, CellStyle::Header);
    assert_eq!(esg.rows[0].texts(), vec!["Error"]);
    assert!(esg.rows[1].texts()[0].contains("no ESG data published for AAPL"));
    assert!(esg
        .rows
        .iter()
        .flat_map(|row| row.cells.iter())
        .all(|cell| !matches!(cell.value, CellValue::Number(..))));
}

#[test]
fn estimated_esg_components_are_tagged_and_latest_block_shows_gaps() {
    // Given: A series with totals only and a snapshot without components
    let report = EsgReport::build(
        vec![EsgObservation {
            timestamp: 1_698_796_800,
            total: Some(20.0),
            ..EsgObservation::default()
        }],
        EsgComponents {
            total: Some(20.0),
            ..EsgComponents::default()
        },
        today(),
    )
    .expect("report with a total");

    // When: The ESG sheet is laid out
    let sheets = layout::layout(&bundle(vec![CategoryReport::Esg(success(
        report,
        SourceTier::Api,
    ))]));
    let esg = &sheets[Category::EsgScores.rank()];

    // Then: Components use the 0.33 estimate and are marked as estimated
    assert_eq!(
        esg.rows[1].texts(),
        vec!["01-11-2023", "20.00", "6.60", "6.60", "6.60", "estimated"]
    );
    let first_column = esg.first_column();
    assert!(first_column.iter().any(|text| text.starts_with("Note: ")));
    assert!(first_column.contains(&String::from("Latest ESG Component Scores")));
    let controversy = esg
        .rows
        .iter()
        .find(|row| row.texts().first().map(String::as_str) == Some("Controversy Level"))
        .expect("controversy row");
    assert_eq!(controversy.texts()[1], "N/A");
}

#[test]
fn snapshot_components_on_past_dates_are_tagged_extrapolated() {
    // Given: A dated total with no components and a complete current snapshot
    let report = EsgReport::build(
        vec![EsgObservation {
            timestamp: 1_600_000_000,
            total: Some(16.0),
            ..EsgObservation::default()
        }],
        EsgComponents {
            total: Some(17.2),
            environmental: Some(0.5),
            social: Some(7.4),
            governance: Some(9.3),
            controversy_level: None,
        },
        today(),
    )
    .expect("report with a total");

    // When: The ESG sheet is laid out
    let sheets = layout::layout(&bundle(vec![CategoryReport::Esg(success(
        report,
        SourceTier::Api,
    ))]));
    let esg = &sheets[Category::EsgScores.rank()];

    // Then: The past row carries snapshot values but is not presented as observed
    assert_eq!(esg.rows[0].texts().last().map(String::as_str), Some("Data Quality"));
    assert_eq!(
        esg.rows[1].texts(),
        vec!["13-09-2020", "16.00", "0.50", "7.40", "9.30", "extrapolated"]
    );
}

// =============================================================================
// Report Output: tables
// =============================================================================

#[test]
fn statement_sheet_rows_match_header_width() {
    // Given: A scraped statement with a short row and a section row
    let table = StatementTable::from_labelled_rows(
        StatementKind::Income,
        vec![String::from("30-09-2023"), String::from("30-09-2022")],
        vec![
            (String::from("Total Revenue"), vec![String::from("383.29B")]),
            (String::from("Operating Expenses"), Vec::new()),
            (
                String::from("Net Income"),
                vec![String::from("97.00B"), String::from("99.80B")],
            ),
        ],
    );
    let reports = vec![CategoryReport::Statement(
        StatementKind::Income,
        success(table, SourceTier::HtmlTable),
    )];

    // When: The bundle is laid out
    let sheets = layout::layout(&bundle(reports));
    let income = &sheets[Category::IncomeStatement.rank()];

    // Then: Every row is as wide as the header and sections are styled
    assert_eq!(income.rows[0].texts(), vec!["Breakdown", "30-09-2023", "30-09-2022"]);
    assert!(income.rows.iter().all(|row| row.cells.len() == 3));
    assert_eq!(income.rows[2].cells[0].style, CellStyle::Section);
    assert!(income.freeze_header);
}

#[test]
fn peers_sheet_highlights_the_subject_row() {
    // Given: A peer set with scores for one peer
    let msft = PeerEsgEntry {
        company_name: String::from("Microsoft Corporation"),
        total_esg_risk_score: Some(17.2),
        ..PeerEsgEntry::bare("MSFT")
    };
    let peers = PeerSet::build(PeerEsgEntry::bare("AAPL"), vec![msft]);

    // When: The bundle is laid out
    let sheets = layout::layout(&bundle(vec![CategoryReport::Peers(success(
        peers,
        SourceTier::HtmlTable,
    ))]));
    let sheet = &sheets[Category::Peers.rank()];

    // Then: The group title spans the table and the subject is highlighted
    assert_eq!(sheet.rows[0].texts(), vec!["Peers"]);
    assert_eq!(sheet.rows[0].merge_to, Some(5));
    assert!(sheet.rows[2].cells.iter().all(|cell| cell.style == CellStyle::Highlight));
    assert_eq!(sheet.rows[3].texts()[..3], ["MSFT", "Microsoft Corporation", "17.20"]);
    assert!(!sheet.first_column().contains(&String::from("Related Tickers")));
}

#[test]
fn sustainability_without_involvement_says_so() {
    // Given: A controversy level but no involvement areas
    let report = SustainabilityReport {
        controversy_level: Some(ControversyLevel::Low),
        involvements: Vec::new(),
    };

    // When: The bundle is laid out
    let sheets = layout::layout(&bundle(vec![CategoryReport::Sustainability(success(
        report,
        SourceTier::Library,
    ))]));
    let sheet = &sheets[Category::Sustainability.rank()];

    // Then: The controversy row is followed by the empty-involvement message
    assert_eq!(sheet.rows[1].texts(), vec!["Controversy Level", "Low"]);
    assert_eq!(
        sheet.first_column().last().map(String::as_str),
        Some("No product involvement data available")
    );
}

// =============================================================================
// Report Output: files
// =============================================================================

#[test]
fn workbook_replaces_an_existing_file() {
    // Given: A stale workbook at the destination
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("AAPL.xlsx");
    std::fs::write(&path, b"stale").expect("seed file");
    let reports = vec![CategoryReport::History(success(price_series(), SourceTier::Api))];

    // When: The bundle is written
    report::write_workbook(&bundle(reports), &path).expect("workbook written");

    // Then: The file is now an xlsx (zip) container
    let bytes = std::fs::read(&path).expect("read workbook");
    assert!(bytes.starts_with(b"PK"));
    assert!(bytes.len() > 1_000);
}
