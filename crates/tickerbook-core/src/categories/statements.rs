//! Income statement, balance sheet and cash flow.
//!
//! Each statement runs its own chain: the page-embedded store (`fmt` values),
//! the rendered page table, then quoteSummary statement modules (`raw` values
//! rendered with the magnitude formatter). A table without any value counts
//! as a failed tier.

use serde_json::Value;

use crate::categories::{Category, CategoryReport, FetchContext};
use crate::domain::{
    fmt_text, raw_number, CalendarDate, StatementKind, StatementPeriod, StatementTable,
};
use crate::fallback::{FallbackChain, FetchOutcome, SourceTier};
use crate::format::magnitude;
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::STATEMENT_MODULES;

/// The three statements, one after another.
pub async fn fetch_all(ctx: &FetchContext) -> Vec<CategoryReport> {
    let mut reports = Vec::with_capacity(StatementKind::ALL.len());
    for kind in StatementKind::ALL {
        reports.push(CategoryReport::Statement(kind, fetch(ctx, kind).await));
    }
    reports
}

pub async fn fetch(ctx: &FetchContext, kind: StatementKind) -> FetchOutcome<StatementTable> {
    FallbackChain::new(Category::for_statement(kind).sheet_name())
        .attempt(SourceTier::EmbeddedJson, "statement page json", from_page_json(ctx, kind))
        .attempt(SourceTier::HtmlTable, "statement page table", from_page_table(ctx, kind))
        .attempt(SourceTier::Library, "quoteSummary statement modules", from_modules(ctx, kind))
        .run()
        .await
}

async fn from_page_json(ctx: &FetchContext, kind: StatementKind) -> Result<StatementTable, SourceError> {
    let html = ctx.client.page(ctx.ticker(), kind.page()).await?;
    let store = scrape::quote_summary_store(&html)?;
    with_data(table_from_store(&store, kind, fmt_text))
}

async fn from_page_table(ctx: &FetchContext, kind: StatementKind) -> Result<StatementTable, SourceError> {
    let html = ctx.client.page(ctx.ticker(), kind.page()).await?;
    with_data(table_from_page(&html, kind)?)
}

async fn from_modules(ctx: &FetchContext, kind: StatementKind) -> Result<StatementTable, SourceError> {
    let result = ctx.client.quote_summary(ctx.ticker(), STATEMENT_MODULES).await?;
    with_data(table_from_store(&result, kind, |value| {
        raw_number(value).map(|raw| magnitude(raw, 2))
    }))
}

fn with_data(table: StatementTable) -> Result<StatementTable, SourceError> {
    if !table.has_data() {
        return Err(SourceError::absent(format!("{} has no values", table.kind.title())));
    }
    Ok(table)
}

/// Builds a statement from a quoteSummary-shaped object, reading each value
/// with `render`. Income statements fall back to the yearly earnings chart.
pub fn table_from_store(store: &Value, kind: StatementKind, render: impl Fn(&Value) -> Option<String>) -> StatementTable {
    let (module, list) = kind.history_path();
    let mut periods: Vec<StatementPeriod> = store
        .get(module)
        .and_then(|module| module.get(list))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(|entry| period_from_entry(entry, &render)).collect())
        .unwrap_or_default();

    if periods.is_empty() && kind == StatementKind::Income {
        periods = yearly_earnings(store, &render);
    }

    StatementTable::assemble(kind, kind.metrics(), periods)
}

fn period_from_entry(entry: &Value, render: &impl Fn(&Value) -> Option<String>) -> Option<StatementPeriod> {
    let object = entry.as_object()?;
    let end_date = object.get("endDate");
    let end = end_date
        .and_then(raw_number)
        .and_then(|seconds| CalendarDate::from_epoch_seconds(seconds as i64))
        .or_else(|| end_date.and_then(fmt_text).and_then(|text| CalendarDate::parse_header(&text)));
    let label = end_date.and_then(fmt_text).unwrap_or_default();

    let values = object
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "endDate" | "maxAge"))
        .filter_map(|(key, value)| render(value).map(|text| (key.clone(), text)))
        .collect();

    Some(StatementPeriod { end, label, values })
}

/// `earnings.financialsChart.yearly`: revenue and earnings per calendar year.
fn yearly_earnings(store: &Value, render: &impl Fn(&Value) -> Option<String>) -> Vec<StatementPeriod> {
    let Some(yearly) = store
        .pointer("/earnings/financialsChart/yearly")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    yearly
        .iter()
        .filter_map(|entry| {
            let year = entry.get("date").and_then(|date| match date {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse::<i64>().ok(),
                _ => None,
            })?;
            let year = i32::try_from(year).ok()?;
            let mut values = std::collections::HashMap::new();
            for (source, key) in [("revenue", "totalRevenue"), ("earnings", "netIncome")] {
                if let Some(text) = entry.get(source).and_then(|value| render(value)) {
                    values.insert(key.to_string(), text);
                }
            }
            Some(StatementPeriod {
                end: CalendarDate::from_ymd(year, 12, 31),
                label: year.to_string(),
                values,
            })
        })
        .collect()
}

/// The first page table whose text looks like `kind`. Period headers that
/// parse as dates are normalized; others (`TTM`) are kept verbatim.
pub fn table_from_page(html: &str, kind: StatementKind) -> Result<StatementTable, SourceError> {
    let table = scrape::tables(html)
        .into_iter()
        .find(|table| kind.matches_table_text(&table.search_text()))
        .ok_or_else(|| SourceError::parse(format!("no {} table on the page", kind.title())))?;

    let dates: Vec<String> = table
        .headers
        .iter()
        .skip(1)
        .map(|header| {
            CalendarDate::parse_header(header)
                .map(|date| date.to_string())
                .unwrap_or_else(|| header.clone())
        })
        .collect();

    let rows = table
        .rows
        .into_iter()
        .filter_map(|mut row| {
            if row.is_empty() {
                return None;
            }
            let label = row.remove(0);
            (!label.is_empty()).then_some((label, row))
        })
        .collect();

    Ok(StatementTable::from_labelled_rows(kind, dates, rows))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn module_statements_render_raw_values_by_magnitude() {
        let result = json!({
            "incomeStatementHistory": {"incomeStatementHistory": [
                {"endDate": {"raw": 1664496000, "fmt": "2022-09-30"}, "totalRevenue": {"raw": 394328000000.0}},
                {"endDate": {"raw": 1696032000, "fmt": "2023-09-30"}, "totalRevenue": {"raw": 383290000000.0},
                 "netIncome": {"raw": 97000000000.0}}
            ]}
        });

        let table = table_from_store(&result, StatementKind::Income, |value| {
            raw_number(value).map(|raw| magnitude(raw, 2))
        });

        assert_eq!(table.dates, vec!["30-09-2023", "30-09-2022"]);
        assert_eq!(table.rows[0].label, "Revenue");
        assert_eq!(table.rows[0].cells, vec!["383.29B", "394.33B"]);
        assert!(table.is_aligned());
        let net_income = table.rows.iter().find(|row| row.label == "Net Income").expect("net income row");
        assert_eq!(net_income.cells, vec!["97.00B", ""]);
    }

    #[test]
    fn income_falls_back_to_yearly_earnings_chart() {
        let store = json!({
            "earnings": {"financialsChart": {"yearly": [
                {"date": 2022, "revenue": {"raw": 1.0, "fmt": "394.33B"}, "earnings": {"raw": 1.0, "fmt": "99.8B"}},
                {"date": "2023", "revenue": {"raw": 1.0, "fmt": "383.29B"}}
            ]}}
        });

        let table = table_from_store(&store, StatementKind::Income, fmt_text);

        assert_eq!(table.dates, vec!["31-12-2023", "31-12-2022"]);
        assert_eq!(table.rows[0].cells, vec!["383.29B", "394.33B"]);
        assert!(table.has_data());
    }

    #[test]
    fn balance_sheet_without_its_module_has_no_data() {
        let table = table_from_store(&json!({}), StatementKind::Balance, fmt_text);
        assert!(!table.has_data());
        assert!(with_data(table).is_err());
    }

    #[test]
    fn page_table_rows_are_padded_to_the_header_dates() {
        let html = r#"
            <table>
              <thead><tr><th>Breakdown</th><th>TTM</th><th>9/30/2023</th></tr></thead>
              <tbody>
                <tr><td>Total Revenue</td><td>385,706,000</td><td>383,285,000</td></tr>
                <tr><td>Net Income</td><td>100,913,000</td></tr>
                <tr><td>Operating Expense</td></tr>
              </tbody>
            </table>"#;

        let table = table_from_page(html, StatementKind::Income).expect("income table");

        assert_eq!(table.dates, vec!["TTM", "30-09-2023"]);
        assert_eq!(table.rows[1].cells, vec!["100,913,000", ""]);
        assert!(table.rows[2].is_section);
        assert!(table.is_aligned());
    }

    #[test]
    fn unrelated_tables_are_not_statements() {
        let html = "<table><tr><th>Date</th><th>Close</th></tr><tr><td>a</td><td>b</td></tr></table>";
        let error = table_from_page(html, StatementKind::CashFlow).expect_err("no cash flow table");
        assert_eq!(error.code(), "source.parse");
    }
}
