//! Financial statement tables.
//!
//! A [`StatementTable`] is an ordered list of period-end dates (newest first)
//! plus rows of `(label, cells)`. Every row has exactly one cell per date;
//! missing values are empty strings. Rows built from a blank provider key are
//! section headers and always have all cells empty.

use std::collections::{BTreeMap, HashMap};

use crate::domain::date::CalendarDate;
use crate::yahoo::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [Self::Income, Self::Balance, Self::CashFlow];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Income => "Income Statement",
            Self::Balance => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
        }
    }

    pub const fn page(self) -> Page {
        match self {
            Self::Income => Page::Financials,
            Self::Balance => Page::BalanceSheet,
            Self::CashFlow => Page::CashFlow,
        }
    }

    /// `(module, list key)` holding annual statements in quoteSummary and in
    /// the page-embedded store.
    pub const fn history_path(self) -> (&'static str, &'static str) {
        match self {
            Self::Income => ("incomeStatementHistory", "incomeStatementHistory"),
            Self::Balance => ("balanceSheetHistory", "balanceSheetStatements"),
            Self::CashFlow => ("cashflowStatementHistory", "cashflowStatements"),
        }
    }

    /// True when a scraped table's text looks like this statement.
    pub fn matches_table_text(self, lowered: &str) -> bool {
        match self {
            Self::Income => {
                (lowered.contains("revenue") && lowered.contains("net income"))
                    || lowered.contains("total revenue")
            }
            Self::Balance => {
                lowered.contains("total assets") && lowered.contains("total liabilities")
            }
            Self::CashFlow => {
                lowered.contains("operating activities") && lowered.contains("investing activities")
            }
        }
    }

    pub const fn metrics(self) -> &'static [MetricSpec] {
        match self {
            Self::Income => INCOME_METRICS,
            Self::Balance => BALANCE_METRICS,
            Self::CashFlow => CASH_FLOW_METRICS,
        }
    }
}

/// `(display label, provider key)`; a blank key marks a section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub label: &'static str,
    pub key: &'static str,
}

impl MetricSpec {
    pub const fn is_section(&self) -> bool {
        self.key.is_empty()
    }
}

const fn metric(label: &'static str, key: &'static str) -> MetricSpec {
    MetricSpec { label, key }
}

const fn section(label: &'static str) -> MetricSpec {
    MetricSpec { label, key: "" }
}

pub const INCOME_METRICS: &[MetricSpec] = &[
    metric("Revenue", "totalRevenue"),
    metric("Cost of Revenue", "costOfRevenue"),
    metric("Gross Profit", "grossProfit"),
    section("Operating Expenses"),
    metric("Research Development", "researchDevelopment"),
    metric("Selling General Administrative", "sellingGeneralAdministrative"),
    metric("Non Recurring", "nonRecurring"),
    metric("Others", "otherOperatingExpenses"),
    metric("Total Operating Expenses", "totalOperatingExpenses"),
    metric("Operating Income or Loss", "operatingIncome"),
    section("Income from Continuing Operations"),
    metric("Total Other Income/Expenses Net", "totalOtherIncomeExpenseNet"),
    metric("Earnings Before Interest and Taxes", "ebit"),
    metric("Interest Expense", "interestExpense"),
    metric("Income Before Tax", "incomeBeforeTax"),
    metric("Income Tax Expense", "incomeTaxExpense"),
    metric("Minority Interest", "minorityInterest"),
    metric("Net Income From Continuing Ops", "netIncomeFromContinuingOps"),
    section("Discontinued Operations"),
    metric("Extraordinary Items", "extraordinaryItems"),
    metric("Effect Of Accounting Changes", "effectOfAccountingChanges"),
    metric("Other Items", "otherItems"),
    metric("Net Income", "netIncome"),
    metric(
        "Net Income Applicable To Common Shares",
        "netIncomeApplicableToCommonShares",
    ),
];

pub const BALANCE_METRICS: &[MetricSpec] = &[
    section("Assets"),
    section("Current Assets"),
    metric("Cash And Cash Equivalents", "cash"),
    metric("Short Term Investments", "shortTermInvestments"),
    metric("Net Receivables", "netReceivables"),
    metric("Inventory", "inventory"),
    metric("Other Current Assets", "otherCurrentAssets"),
    metric("Total Current Assets", "totalCurrentAssets"),
    section("Long Term Assets"),
    metric("Long Term Investments", "longTermInvestments"),
    metric("Property Plant Equipment", "propertyPlantEquipment"),
    metric("Goodwill", "goodwill"),
    metric("Intangible Assets", "intangibleAssets"),
    metric("Other Assets", "otherAssets"),
    metric("Total Assets", "totalAssets"),
    section("Liabilities"),
    section("Current Liabilities"),
    metric("Accounts Payable", "accountsPayable"),
    metric("Short Term Debt", "shortLongTermDebt"),
    metric("Other Current Liabilities", "otherCurrentLiabilities"),
    metric("Total Current Liabilities", "totalCurrentLiabilities"),
    metric("Long Term Debt", "longTermDebt"),
    metric("Other Liabilities", "otherLiabilities"),
    metric("Total Liabilities", "totalLiab"),
    section("Stockholders' Equity"),
    metric("Common Stock", "commonStock"),
    metric("Retained Earnings", "retainedEarnings"),
    metric("Treasury Stock", "treasuryStock"),
    metric("Other Stockholder Equity", "otherStockholderEquity"),
    metric("Total Stockholder Equity", "totalStockholderEquity"),
];

pub const CASH_FLOW_METRICS: &[MetricSpec] = &[
    section("Operating Activities"),
    metric("Net Income", "netIncome"),
    metric("Depreciation", "depreciation"),
    metric("Change in Working Capital", "changeToNetincome"),
    metric("Change in Accounts Receivable", "changeToAccountReceivables"),
    metric("Change in Liabilities", "changeToLiabilities"),
    metric("Change in Inventory", "changeToInventory"),
    metric("Change in Other Operating Activities", "changeToOperatingActivities"),
    metric(
        "Total Cash Flow from Operating Activities",
        "totalCashFromOperatingActivities",
    ),
    section("Investing Activities"),
    metric("Capital Expenditures", "capitalExpenditures"),
    metric("Investments", "investments"),
    metric(
        "Other Cash Flows from Investing Activities",
        "otherCashflowsFromInvestingActivities",
    ),
    metric(
        "Total Cash Flows from Investing Activities",
        "totalCashflowsFromInvestingActivities",
    ),
    section("Financing Activities"),
    metric("Dividends Paid", "dividendsPaid"),
    metric("Stock Sale and Purchase", "netBorrowings"),
    metric(
        "Other Cash Flows from Financing Activities",
        "otherCashflowsFromFinancingActivities",
    ),
    metric(
        "Total Cash Flows from Financing Activities",
        "totalCashFromFinancingActivities",
    ),
    metric("Net Change in Cash", "changeInCash"),
    section("Cash at Beginning of Period"),
    metric("Cash at End of Period", "endCashPosition"),
];

/// One reporting period: its end date and display values by provider key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementPeriod {
    pub end: Option<CalendarDate>,
    pub label: String,
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRow {
    pub label: String,
    pub cells: Vec<String>,
    pub is_section: bool,
}

impl StatementRow {
    /// Cell count including the label column.
    pub fn width(&self) -> usize {
        self.cells.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTable {
    pub kind: StatementKind,
    pub dates: Vec<String>,
    pub rows: Vec<StatementRow>,
}

impl StatementTable {
    /// Assembles an aligned table from keyed periods using `metrics`.
    ///
    /// Periods are sorted newest first by end date and deduplicated by that
    /// date (first one wins). Periods without a parseable end date keep their
    /// label and sort after dated ones.
    pub fn assemble(kind: StatementKind, metrics: &[MetricSpec], periods: Vec<StatementPeriod>) -> Self {
        let periods = order_periods(periods);
        let dates: Vec<String> = periods.iter().map(period_label).collect();

        let rows = metrics
            .iter()
            .map(|spec| {
                let cells = if spec.is_section() {
                    vec![String::new(); dates.len()]
                } else {
                    periods
                        .iter()
                        .map(|period| period.values.get(spec.key).cloned().unwrap_or_default())
                        .collect()
                };
                StatementRow {
                    label: spec.label.to_string(),
                    cells,
                    is_section: spec.is_section(),
                }
            })
            .collect();

        Self { kind, dates, rows }
    }

    /// Builds a table from scraped label rows. Each row is padded or truncated
    /// to the number of dates.
    pub fn from_labelled_rows(kind: StatementKind, dates: Vec<String>, rows: Vec<(String, Vec<String>)>) -> Self {
        let width = dates.len();
        let rows = rows
            .into_iter()
            .map(|(label, mut cells)| {
                cells.resize(width, String::new());
                let is_section = cells.iter().all(|cell| cell.is_empty());
                StatementRow {
                    label,
                    cells,
                    is_section,
                }
            })
            .collect();
        Self { kind, dates, rows }
    }

    /// True when at least one row carries a value.
    pub fn has_data(&self) -> bool {
        !self.dates.is_empty()
            && self
                .rows
                .iter()
                .any(|row| row.cells.iter().any(|cell| !cell.is_empty()))
    }

    pub fn is_aligned(&self) -> bool {
        self.rows.iter().all(|row| row.width() == self.dates.len() + 1)
    }
}

fn order_periods(periods: Vec<StatementPeriod>) -> Vec<StatementPeriod> {
    let mut dated: BTreeMap<CalendarDate, StatementPeriod> = BTreeMap::new();
    let mut undated = Vec::new();
    for period in periods {
        match period.end {
            Some(end) => {
                dated.entry(end).or_insert(period);
            }
            None => undated.push(period),
        }
    }

    dated.into_values().rev().chain(undated).collect()
}

fn period_label(period: &StatementPeriod) -> String {
    period
        .end
        .map(|end| end.to_string())
        .unwrap_or_else(|| period.label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, values: &[(&str, &str)]) -> StatementPeriod {
        StatementPeriod {
            end: CalendarDate::from_ymd(year, 9, 30),
            label: String::new(),
            values: values
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    #[test]
    fn every_row_has_one_cell_per_date() {
        let table = StatementTable::assemble(
            StatementKind::Income,
            INCOME_METRICS,
            vec![
                period(2022, &[("totalRevenue", "394.33B")]),
                period(2023, &[("totalRevenue", "383.29B"), ("netIncome", "97.00B")]),
            ],
        );

        assert_eq!(table.dates, vec!["30-09-2023", "30-09-2022"]);
        assert!(table.is_aligned());
        assert_eq!(table.rows.len(), INCOME_METRICS.len());
        assert_eq!(table.rows[0].cells, vec!["383.29B", "394.33B"]);

        let net_income = table
            .rows
            .iter()
            .find(|row| row.label == "Net Income")
            .expect("net income row");
        assert_eq!(net_income.cells, vec!["97.00B", ""]);
    }

    #[test]
    fn section_rows_are_blank() {
        let table = StatementTable::assemble(
            StatementKind::Balance,
            BALANCE_METRICS,
            vec![period(2023, &[("cash", "29.97B")])],
        );

        let sections: Vec<&StatementRow> = table.rows.iter().filter(|row| row.is_section).collect();
        assert_eq!(sections[0].label, "Assets");
        assert!(sections.iter().all(|row| row.cells == vec![String::new()]));
    }

    #[test]
    fn duplicate_period_dates_are_collapsed() {
        let table = StatementTable::assemble(
            StatementKind::CashFlow,
            CASH_FLOW_METRICS,
            vec![
                period(2023, &[("netIncome", "first")]),
                period(2023, &[("netIncome", "second")]),
            ],
        );

        assert_eq!(table.dates.len(), 1);
        assert_eq!(table.rows[1].cells, vec!["first"]);
    }

    #[test]
    fn labelled_rows_are_padded_to_date_count() {
        let table = StatementTable::from_labelled_rows(
            StatementKind::Income,
            vec![String::from("30-09-2023"), String::from("30-09-2022")],
            vec![
                (String::from("Total Revenue"), vec![String::from("383,285,000")]),
                (
                    String::from("Operating Expense"),
                    vec![String::from("1"), String::from("2"), String::from("3")],
                ),
            ],
        );

        assert!(table.is_aligned());
        assert_eq!(table.rows[0].cells, vec!["383,285,000", ""]);
        assert_eq!(table.rows[1].cells, vec!["1", "2"]);
        assert!(table.has_data());
    }

    #[test]
    fn table_keyword_detection_per_statement() {
        assert!(StatementKind::Income.matches_table_text("breakdown total revenue cost"));
        assert!(StatementKind::Balance.matches_table_text("total assets ... total liabilities net minority"));
        assert!(!StatementKind::CashFlow.matches_table_text("total assets"));
    }
}
