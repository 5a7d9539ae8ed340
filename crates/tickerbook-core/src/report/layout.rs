//! Sheet layout.
//!
//! Converts a [`ReportBundle`] into ordered [`Sheet`] values. Layout is pure
//! data so it can be checked without opening a workbook.

use crate::aggregator::ReportBundle;
use crate::categories::{Category, CategoryReport};
use crate::domain::{
    CompanySummary, EsgReport, KeyStatistics, PeerEsgEntry, PeerSet, PriceSeries, StatementTable,
    SustainabilityReport,
};
use crate::fallback::{FetchOutcome, Unavailable};

const PEER_COLUMNS: [&str; 6] = [
    "Ticker",
    "Company Name",
    "Total ESG Risk Score",
    "E Score",
    "S Score",
    "G Score",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    /// Column header row.
    Header,
    /// Section title inside a table (statement sections, statistic groups).
    Section,
    /// Band title spanning the table (`Peers`, `Related Tickers`).
    Group,
    /// The subject's own row in a comparison table.
    Highlight,
    /// Bold label next to a value.
    Label,
    /// Wrapped italic text.
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64, NumberStyle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn text(value: impl Into<String>, style: CellStyle) -> Self {
        Self {
            value: CellValue::Text(value.into()),
            style,
        }
    }

    pub fn number(value: f64, number_style: NumberStyle) -> Self {
        Self {
            value: CellValue::Number(value, number_style),
            style: CellStyle::Plain,
        }
    }

    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            style: CellStyle::Plain,
        }
    }

    fn optional_score(value: Option<f64>, style: CellStyle) -> Self {
        match value {
            Some(score) => Self {
                value: CellValue::Number(score, NumberStyle::Decimal),
                style,
            },
            None => Self::text("", style),
        }
    }

    /// Display text, as it would read in the sheet.
    pub fn as_text(&self) -> String {
        match &self.value {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value, NumberStyle::Decimal) => format!("{value:.2}"),
            CellValue::Number(value, NumberStyle::Integer) => format!("{value:.0}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// When set, the first cell spans columns `0..=merge_to`.
    pub merge_to: Option<u16>,
    pub height: Option<f64>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            merge_to: None,
            height: None,
        }
    }

    pub fn blank() -> Self {
        Self::new(Vec::new())
    }

    fn merged(cell: Cell, last_column: u16) -> Self {
        Self {
            cells: vec![cell],
            merge_to: (last_column > 0).then_some(last_column),
            height: None,
        }
    }

    fn headers(labels: &[&str]) -> Self {
        Self::new(
            labels
                .iter()
                .map(|label| Cell::text(*label, CellStyle::Header))
                .collect(),
        )
    }

    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(Cell::as_text).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub rows: Vec<Row>,
    pub column_widths: Vec<f64>,
    pub freeze_header: bool,
}

impl Sheet {
    fn new(category: Category) -> Self {
        Self {
            name: category.sheet_name(),
            rows: Vec::new(),
            column_widths: Vec::new(),
            freeze_header: false,
        }
    }

    fn widths(mut self, widths: &[f64]) -> Self {
        self.column_widths = widths.to_vec();
        self
    }

    fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Text of the first cell of every row.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.cells.first().map(Cell::as_text).unwrap_or_default())
            .collect()
    }
}

/// All nine sheets in rank order.
pub fn layout(bundle: &ReportBundle) -> Vec<Sheet> {
    Category::ALL
        .into_iter()
        .map(|category| match bundle.get(category) {
            Some(report) => sheet_for(report),
            None => error_sheet(category, "category was not collected"),
        })
        .collect()
}

pub fn sheet_for(report: &CategoryReport) -> Sheet {
    let category = report.category();
    match report {
        CategoryReport::History(outcome) => render(category, outcome, history_sheet),
        CategoryReport::Esg(outcome) => render(category, outcome, esg_sheet),
        CategoryReport::Summary(outcome) => render(category, outcome, summary_sheet),
        CategoryReport::Statistics(outcome) => render(category, outcome, statistics_sheet),
        CategoryReport::Statement(_, outcome) => render(category, outcome, statement_sheet),
        CategoryReport::Sustainability(outcome) => render(category, outcome, sustainability_sheet),
        CategoryReport::Peers(outcome) => render(category, outcome, peers_sheet),
    }
}

fn render<T>(category: Category, outcome: &FetchOutcome<T>, build: fn(Category, &T) -> Sheet) -> Sheet {
    match outcome {
        FetchOutcome::Success(fetched) => build(category, &fetched.data),
        FetchOutcome::Unavailable(unavailable) => error_sheet(category, &unavailable_message(category, unavailable)),
    }
}

fn unavailable_message(category: Category, unavailable: &Unavailable) -> String {
    let mut message = format!(
        "Could not fetch {} data: {}",
        category.sheet_name().to_lowercase(),
        unavailable.reason
    );
    if let Some(error) = &unavailable.last_error {
        message.push_str(&format!(" (last error: {error})"));
    }
    message
}

/// A single `Error` header over one message cell.
pub fn error_sheet(category: Category, message: &str) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[100.0]);
    sheet.push(Row::headers(&["Error"]));
    sheet.push(Row::new(vec![Cell::text(message, CellStyle::Plain)]));
    sheet
}

fn history_sheet(category: Category, series: &PriceSeries) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[12.0, 12.0, 12.0, 12.0, 12.0, 16.0]);
    sheet.freeze_header = true;
    sheet.push(Row::headers(&["Date", "Open", "High", "Low", "Close", "Volume"]));
    for bar in series.bars() {
        sheet.push(Row::new(vec![
            Cell::text(bar.date.to_string(), CellStyle::Plain),
            Cell::number(bar.open, NumberStyle::Decimal),
            Cell::number(bar.high, NumberStyle::Decimal),
            Cell::number(bar.low, NumberStyle::Decimal),
            Cell::number(bar.close, NumberStyle::Decimal),
            bar.volume
                .map(|volume| Cell::number(volume, NumberStyle::Integer))
                .unwrap_or_else(Cell::empty),
        ]));
    }
    sheet
}

fn esg_sheet(category: Category, report: &EsgReport) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[15.0, 15.0, 15.0, 15.0, 15.0, 14.0]);
    sheet.freeze_header = true;
    sheet.push(Row::headers(&[
        "Date",
        "ESG Score",
        "Environmental",
        "Social",
        "Governance",
        "Data Quality",
    ]));
    for record in &report.records {
        sheet.push(Row::new(vec![
            Cell::text(record.date.to_string(), CellStyle::Plain),
            Cell::number(record.total_score, NumberStyle::Decimal),
            Cell::number(record.environmental, NumberStyle::Decimal),
            Cell::number(record.social, NumberStyle::Decimal),
            Cell::number(record.governance, NumberStyle::Decimal),
            Cell::text(record.data_quality.as_str(), CellStyle::Plain),
        ]));
    }

    sheet.push(Row::blank());
    sheet.push(Row::merged(Cell::text(format!("Note: {}", report.note), CellStyle::Note), 4));
    sheet.push(Row::blank());
    sheet.push(Row::merged(Cell::text("Latest ESG Component Scores", CellStyle::Header), 4));

    let latest = &report.latest;
    let score = |value: Option<f64>| {
        value
            .map(|score| Cell::number(score, NumberStyle::Decimal))
            .unwrap_or_else(|| Cell::text("N/A", CellStyle::Plain))
    };
    for (label, value) in [
        ("Total ESG Score", score(latest.total)),
        ("Environmental Score", score(latest.environmental)),
        ("Social Score", score(latest.social)),
        ("Governance Score", score(latest.governance)),
        (
            "Controversy Level",
            Cell::text(
                latest.controversy_level.clone().unwrap_or_else(|| String::from("N/A")),
                CellStyle::Plain,
            ),
        ),
    ] {
        sheet.push(Row::new(vec![Cell::text(label, CellStyle::Label), value]));
    }
    sheet
}

fn summary_sheet(category: Category, summary: &CompanySummary) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[38.0, 38.0, 38.0, 38.0]);
    let columns = &summary.quote.columns;
    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
    for index in 0..depth {
        sheet.push(Row::new(
            columns
                .iter()
                .map(|column| match column.get(index) {
                    Some(field) => Cell::text(format!("{}: {}", field.label, field.value.display()), CellStyle::Plain),
                    None => Cell::empty(),
                })
                .collect(),
        ));
    }

    let profile = &summary.profile;
    sheet.push(Row::blank());
    sheet.push(Row::new(vec![
        Cell::text(profile.employees.display(), CellStyle::Plain),
        Cell::text(profile.fiscal_year_end.display(), CellStyle::Plain),
    ]));
    sheet.push(Row::new(vec![
        Cell::text("Full Time Employees", CellStyle::Label),
        Cell::text("Fiscal Year Ends", CellStyle::Label),
    ]));
    sheet.push(Row::blank());
    sheet.push(Row::new(vec![
        Cell::text(profile.sector.display(), CellStyle::Plain),
        Cell::text(profile.industry.display(), CellStyle::Plain),
    ]));
    sheet.push(Row::new(vec![
        Cell::text("Sector", CellStyle::Label),
        Cell::text("Industry", CellStyle::Label),
    ]));
    sheet.push(Row::blank());
    sheet.push(Row::merged(
        Cell::text(format!("{} Overview", profile.name.value), CellStyle::Header),
        3,
    ));
    let mut description = Row::merged(Cell::text(profile.description.display(), CellStyle::Note), 3);
    description.height = Some(120.0);
    sheet.push(description);
    sheet
}

fn statistics_sheet(category: Category, statistics: &KeyStatistics) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[30.0, 20.0]);
    sheet.freeze_header = true;
    sheet.push(Row::headers(&["Metric", "Value"]));
    for (index, section) in statistics.sections.iter().enumerate() {
        if index > 0 {
            let mut spacer = Row::blank();
            spacer.height = Some(10.0);
            sheet.push(spacer);
        }
        let mut title = Row::new(vec![
            Cell::text(section.title, CellStyle::Section),
            Cell::text("", CellStyle::Section),
        ]);
        title.height = Some(22.0);
        sheet.push(title);
        for row in &section.rows {
            sheet.push(Row::new(vec![
                Cell::text(row.label, CellStyle::Plain),
                Cell::text(row.display(), CellStyle::Plain),
            ]));
        }
    }
    sheet
}

fn statement_sheet(category: Category, table: &StatementTable) -> Sheet {
    let mut widths = vec![40.0];
    widths.extend(std::iter::repeat(15.0).take(table.dates.len()));
    let mut sheet = Sheet::new(category).widths(&widths);
    sheet.freeze_header = true;

    let mut header = vec![Cell::text("Breakdown", CellStyle::Header)];
    header.extend(table.dates.iter().map(|date| Cell::text(date.as_str(), CellStyle::Header)));
    sheet.push(Row::new(header));

    for row in &table.rows {
        let style = if row.is_section {
            CellStyle::Section
        } else {
            CellStyle::Plain
        };
        let mut cells = vec![Cell::text(row.label.as_str(), if row.is_section { style } else { CellStyle::Label })];
        cells.extend(row.cells.iter().map(|cell| Cell::text(cell.as_str(), style)));
        sheet.push(Row::new(cells));
    }
    sheet
}

fn sustainability_sheet(category: Category, report: &SustainabilityReport) -> Sheet {
    let mut sheet = Sheet::new(category).widths(&[40.0, 30.0]);
    sheet.push(Row::headers(&["Category", "Value"]));
    sheet.push(Row::new(vec![
        Cell::text("Controversy Level", CellStyle::Label),
        Cell::text(
            report
                .controversy_level
                .map(|level| level.as_str())
                .unwrap_or("N/A"),
            CellStyle::Plain,
        ),
    ]));
    sheet.push(Row::blank());
    sheet.push(Row::new(vec![
        Cell::text("Product Involvement Areas", CellStyle::Section),
        Cell::text("", CellStyle::Section),
    ]));
    if report.involvements.is_empty() {
        sheet.push(Row::new(vec![Cell::text(
            "No product involvement data available",
            CellStyle::Plain,
        )]));
    }
    for involvement in &report.involvements {
        sheet.push(Row::new(vec![
            Cell::text(involvement.category.as_str(), CellStyle::Plain),
            Cell::text(involvement.value.as_str(), CellStyle::Plain),
        ]));
    }
    sheet
}

fn peers_sheet(category: Category, peers: &PeerSet) -> Sheet {
    let last_column = (PEER_COLUMNS.len() - 1) as u16;
    let mut sheet = Sheet::new(category).widths(&[10.0, 30.0, 20.0, 10.0, 10.0, 10.0]);

    sheet.push(Row::merged(Cell::text("Peers", CellStyle::Group), last_column));
    sheet.push(Row::headers(&PEER_COLUMNS));
    for (index, entry) in peers.close().iter().enumerate() {
        let style = if index == 0 {
            CellStyle::Highlight
        } else {
            CellStyle::Plain
        };
        sheet.push(peer_row(entry, style));
    }

    if !peers.related().is_empty() {
        sheet.push(Row::blank());
        sheet.push(Row::merged(Cell::text("Related Tickers", CellStyle::Group), last_column));
        sheet.push(Row::headers(&PEER_COLUMNS));
        for entry in peers.related() {
            sheet.push(peer_row(entry, CellStyle::Plain));
        }
    }
    sheet
}

fn peer_row(entry: &PeerEsgEntry, style: CellStyle) -> Row {
    Row::new(vec![
        Cell::text(entry.ticker.as_str(), style),
        Cell::text(entry.company_name.as_str(), style),
        Cell::optional_score(entry.total_esg_risk_score, style),
        Cell::optional_score(entry.e_score, style),
        Cell::optional_score(entry.s_score, style),
        Cell::optional_score(entry.g_score, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalendarDate, StatementKind, Symbol};

    fn bundle(reports: Vec<CategoryReport>) -> ReportBundle {
        ReportBundle::new(
            Symbol::parse("AAPL").expect("symbol"),
            CalendarDate::from_ymd(2026, 10, 19).expect("date"),
            reports,
        )
    }

    #[test]
    fn unavailable_categories_render_an_error_sheet() {
        let sheets = layout(&bundle(Vec::new()));

        let names: Vec<&str> = sheets.iter().map(|sheet| sheet.name).collect();
        assert_eq!(names, Category::ALL.map(Category::sheet_name).to_vec());
        for sheet in &sheets {
            assert_eq!(sheet.rows.len(), 2);
            assert_eq!(sheet.rows[0].texts(), vec!["Error"]);
            assert!(sheet.rows[1].texts()[0].starts_with("Could not fetch"));
        }
    }

    #[test]
    fn statement_rows_match_header_width() {
        let table = StatementTable::from_labelled_rows(
            StatementKind::Balance,
            vec![String::from("30-09-2023"), String::from("30-09-2022")],
            vec![
                (String::from("Total Assets"), vec![String::from("352.58B")]),
                (String::from("Liabilities"), Vec::new()),
            ],
        );
        let sheet = statement_sheet(Category::BalanceSheet, &table);

        let width = sheet.rows[0].cells.len();
        assert_eq!(width, 3);
        assert!(sheet.rows.iter().all(|row| row.cells.len() == width));
        assert_eq!(sheet.rows[2].cells[0].style, CellStyle::Section);
    }

    #[test]
    fn peers_sheet_highlights_subject_and_splits_bands() {
        let candidates = (0..7).map(|i| PeerEsgEntry::bare(&format!("P{i}"))).collect();
        let sheet = peers_sheet(Category::Peers, &PeerSet::build(PeerEsgEntry::bare("AAPL"), candidates));

        assert_eq!(sheet.rows[0].merge_to, Some(5));
        assert_eq!(sheet.rows[2].cells[0].style, CellStyle::Highlight);
        assert_eq!(sheet.rows[2].texts()[0], "AAPL");
        assert!(sheet.first_column().contains(&String::from("Related Tickers")));
        // title, header, 5 close rows, blank, title, header, 3 related rows
        assert_eq!(sheet.rows.len(), 13);
    }
}
