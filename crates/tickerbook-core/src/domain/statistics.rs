use crate::domain::date::CalendarDate;
use crate::domain::facts::{FactValue, Facts};
use crate::domain::quality::Sourced;
use crate::format;

/// Rendering rule for one statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// `$` prefix with magnitude suffix.
    Money,
    /// Fraction scaled to percent.
    Percent,
    /// Published as a percentage already.
    PublishedPercent,
    Ratio,
    /// Epoch seconds rendered `yyyy-mm-dd`.
    Date,
    Count,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSpec {
    pub label: &'static str,
    pub key: &'static str,
    pub kind: StatKind,
}

const fn stat(label: &'static str, key: &'static str, kind: StatKind) -> StatSpec {
    StatSpec { label, key, kind }
}

pub const STAT_SECTIONS: &[(&str, &[StatSpec])] = &[
    (
        "Valuation Measures",
        &[
            stat("Market Cap", "marketCap", StatKind::Money),
            stat("Enterprise Value", "enterpriseValue", StatKind::Money),
            stat("Trailing P/E", "trailingPE", StatKind::Ratio),
            stat("Forward P/E", "forwardPE", StatKind::Ratio),
            stat("PEG Ratio", "pegRatio", StatKind::Ratio),
            stat("Price/Sales (ttm)", "priceToSalesTrailing12Months", StatKind::Ratio),
            stat("Price/Book", "priceToBook", StatKind::Ratio),
            stat("Enterprise Value/Revenue", "enterpriseToRevenue", StatKind::Ratio),
            stat("Enterprise Value/EBITDA", "enterpriseToEbitda", StatKind::Ratio),
        ],
    ),
    (
        "Financial Highlights",
        &[
            stat("Profit Margin", "profitMargins", StatKind::Percent),
            stat("Operating Margin (ttm)", "operatingMargins", StatKind::Percent),
            stat("Return on Assets", "returnOnAssets", StatKind::Percent),
            stat("Return on Equity", "returnOnEquity", StatKind::Percent),
            stat("Revenue (ttm)", "totalRevenue", StatKind::Money),
            stat("Revenue Per Share", "revenuePerShare", StatKind::Ratio),
            stat("Quarterly Revenue Growth", "revenueGrowth", StatKind::Percent),
            stat("Gross Profit (ttm)", "grossProfits", StatKind::Money),
            stat("EBITDA", "ebitda", StatKind::Money),
            stat("Diluted EPS (ttm)", "trailingEps", StatKind::Ratio),
            stat("Quarterly Earnings Growth", "earningsGrowth", StatKind::Percent),
        ],
    ),
    (
        "Trading Information",
        &[
            stat("Beta (5Y Monthly)", "beta", StatKind::Ratio),
            stat("52-Week High", "fiftyTwoWeekHigh", StatKind::Ratio),
            stat("52-Week Low", "fiftyTwoWeekLow", StatKind::Ratio),
            stat("50-Day Moving Average", "fiftyDayAverage", StatKind::Ratio),
            stat("200-Day Moving Average", "twoHundredDayAverage", StatKind::Ratio),
            stat("Average Volume (3 Month)", "averageVolume", StatKind::Count),
            stat("Average Volume (10 Day)", "averageVolume10days", StatKind::Count),
        ],
    ),
    (
        "Dividends & Splits",
        &[
            stat("Forward Annual Dividend Rate", "dividendRate", StatKind::Ratio),
            stat("Forward Annual Dividend Yield", "dividendYield", StatKind::Percent),
            stat("Payout Ratio", "payoutRatio", StatKind::PublishedPercent),
            stat("Ex-Dividend Date", "exDividendDate", StatKind::Date),
            stat("Last Split Factor", "lastSplitFactor", StatKind::Text),
            stat("Last Split Date", "lastSplitDate", StatKind::Date),
        ],
    ),
    (
        "Balance Sheet",
        &[
            stat("Total Cash", "totalCash", StatKind::Money),
            stat("Total Cash Per Share", "totalCashPerShare", StatKind::Ratio),
            stat("Total Debt", "totalDebt", StatKind::Money),
            stat("Total Debt/Equity", "debtToEquity", StatKind::Ratio),
            stat("Current Ratio", "currentRatio", StatKind::Ratio),
            stat("Book Value Per Share", "bookValue", StatKind::Ratio),
        ],
    ),
    (
        "Cash Flow",
        &[
            stat("Operating Cash Flow (ttm)", "operatingCashflow", StatKind::Money),
            stat("Levered Free Cash Flow (ttm)", "freeCashflow", StatKind::Money),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub label: &'static str,
    /// `None` renders as `N/A`.
    pub value: Option<Sourced<String>>,
}

impl StatRow {
    pub fn display(&self) -> String {
        self.value
            .as_ref()
            .map(Sourced::display)
            .unwrap_or_else(|| String::from("N/A"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatSection {
    pub title: &'static str,
    pub rows: Vec<StatRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyStatistics {
    pub sections: Vec<StatSection>,
}

impl KeyStatistics {
    pub fn from_facts(facts: &Facts) -> Self {
        let sections = STAT_SECTIONS
            .iter()
            .map(|&(title, specs)| StatSection {
                title,
                rows: specs
                    .iter()
                    .map(|spec| StatRow {
                        label: spec.label,
                        value: render_stat(facts, spec),
                    })
                    .collect(),
            })
            .collect();
        Self { sections }
    }

    /// Number of statistics with a value.
    pub fn populated(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|section| &section.rows)
            .filter(|row| row.value.is_some())
            .count()
    }

    pub fn get(&self, label: &str) -> Option<&StatRow> {
        self.sections
            .iter()
            .flat_map(|section| &section.rows)
            .find(|row| row.label == label)
    }
}

fn render_stat(facts: &Facts, spec: &StatSpec) -> Option<Sourced<String>> {
    let fact = facts.get(spec.key)?;
    let text = match (&fact.value, spec.kind) {
        (FactValue::Text(text), _) => text.clone(),
        (FactValue::Number(value), StatKind::Money) => format::money(*value),
        (FactValue::Number(value), StatKind::Percent) => format::percent(*value, false),
        (FactValue::Number(value), StatKind::PublishedPercent) => format::percent(*value, true),
        (FactValue::Number(value), StatKind::Ratio) => format::fixed2(*value),
        (FactValue::Number(value), StatKind::Count) => format::thousands(*value),
        (FactValue::Number(value), StatKind::Date) => {
            CalendarDate::from_epoch_seconds(*value as i64)?.to_iso_string()
        }
        (FactValue::Number(value), StatKind::Text) => value.to_string(),
    };
    Some(Sourced::new(text, fact.provenance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quality::Provenance;

    #[test]
    fn statistics_cover_six_sections_with_na_for_missing() {
        let stats = KeyStatistics::from_facts(&Facts::new());

        let titles: Vec<&str> = stats.sections.iter().map(|section| section.title).collect();
        assert_eq!(
            titles,
            vec![
                "Valuation Measures",
                "Financial Highlights",
                "Trading Information",
                "Dividends & Splits",
                "Balance Sheet",
                "Cash Flow"
            ]
        );
        assert_eq!(stats.populated(), 0);
        assert_eq!(stats.get("Market Cap").map(StatRow::display).as_deref(), Some("N/A"));
    }

    #[test]
    fn values_render_by_kind() {
        let mut facts = Facts::new();
        facts.insert_number("marketCap", 2_500_000_000.0, Provenance::Primary);
        facts.insert_number("profitMargins", 0.07, Provenance::Primary);
        facts.insert_number("payoutRatio", 0.15, Provenance::Primary);
        facts.insert_number("trailingPE", 31.5, Provenance::Scraped);
        facts.insert_number("averageVolume", 55_123_456.0, Provenance::Primary);
        // 2024-01-05T14:30:00Z
        facts.insert_number("exDividendDate", 1_704_465_000.0, Provenance::Primary);
        facts.insert_text("lastSplitFactor", "4:1", Provenance::Primary);
        facts.insert_number("beta", 1.3, Provenance::Estimated);

        let stats = KeyStatistics::from_facts(&facts);
        let shown = |label: &str| stats.get(label).map(StatRow::display);

        assert_eq!(shown("Market Cap").as_deref(), Some("$2.50B"));
        assert_eq!(shown("Profit Margin").as_deref(), Some("7.00%"));
        assert_eq!(shown("Payout Ratio").as_deref(), Some("0.15%"));
        assert_eq!(shown("Trailing P/E").as_deref(), Some("31.50"));
        assert_eq!(shown("Average Volume (3 Month)").as_deref(), Some("55,123,456"));
        assert_eq!(shown("Ex-Dividend Date").as_deref(), Some("2024-01-05"));
        assert_eq!(shown("Last Split Factor").as_deref(), Some("4:1"));
        assert_eq!(shown("Beta (5Y Monthly)").as_deref(), Some("1.30 (est.)"));
        assert_eq!(stats.populated(), 8);
    }
}
