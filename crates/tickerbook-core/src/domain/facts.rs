use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::quality::Provenance;

#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub value: FactValue,
    pub provenance: Provenance,
}

/// Flat map of provider "info" fields keyed by provider name
/// (`marketCap`, `trailingPE`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    entries: BTreeMap<String, Fact>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a quoteSummary result. Module objects are walked recursively;
    /// `{raw, fmt}` wrappers become numbers and bare strings become text.
    /// Modules are visited in name order; the first one publishing a key wins.
    pub fn from_quote_summary(result: &Value) -> Self {
        let mut facts = Self::new();
        if let Value::Object(modules) = result {
            for module in modules.values() {
                facts.absorb(module, Provenance::Primary, 0);
            }
        }
        facts
    }

    fn absorb(&mut self, value: &Value, provenance: Provenance, depth: usize) {
        let Value::Object(fields) = value else {
            return;
        };
        for (key, field) in fields {
            if let Some(fact) = leaf_value(field) {
                self.entries.entry(key.clone()).or_insert(Fact {
                    value: fact,
                    provenance,
                });
            } else if depth < 2 && field.is_object() {
                self.absorb(field, provenance, depth + 1);
            }
        }
    }

    pub fn insert_number(&mut self, key: &str, value: f64, provenance: Provenance) {
        if value.is_finite() {
            self.entries.insert(
                key.to_string(),
                Fact {
                    value: FactValue::Number(value),
                    provenance,
                },
            );
        }
    }

    pub fn insert_text(&mut self, key: &str, value: impl Into<String>, provenance: Provenance) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.entries.insert(
                key.to_string(),
                Fact {
                    value: FactValue::Text(value),
                    provenance,
                },
            );
        }
    }

    /// Adds keys from `other` that this map does not have yet.
    pub fn fill_from(&mut self, other: Facts) {
        for (key, fact) in other.entries {
            self.entries.entry(key).or_insert(fact);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Fact> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.entries.get(key).map(|fact| &fact.value) {
            Some(FactValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key).map(|fact| &fact.value) {
            Some(FactValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn provenance(&self, key: &str) -> Option<Provenance> {
        self.entries.get(key).map(|fact| fact.provenance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a scraped label's text is read into a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Number,
    /// `25.31%` is stored as the fraction `0.2531`.
    Percent,
    Text,
    /// `0.96 (0.52%)` splits into `dividendRate` and `dividendYield`.
    Dividend,
}

/// Page label fragments and the provider keys they feed. Matching is by
/// substring in table order, so longer labels precede their prefixes.
const LABEL_KEYS: &[(&str, &str, LabelKind)] = &[
    ("Previous Close", "previousClose", LabelKind::Number),
    ("Open", "open", LabelKind::Number),
    ("Bid", "bid", LabelKind::Text),
    ("Ask", "ask", LabelKind::Text),
    ("Day's Range", "dayRange", LabelKind::Text),
    ("52 Week Range", "fiftyTwoWeekRange", LabelKind::Text),
    ("Avg. Volume", "averageVolume", LabelKind::Number),
    ("Avg Vol (3 month)", "averageVolume", LabelKind::Number),
    ("Avg Vol (10 day)", "averageVolume10days", LabelKind::Number),
    ("Volume", "volume", LabelKind::Number),
    ("Market Cap", "marketCap", LabelKind::Number),
    ("Enterprise Value/Revenue", "enterpriseToRevenue", LabelKind::Number),
    ("Enterprise Value/EBITDA", "enterpriseToEbitda", LabelKind::Number),
    ("Enterprise Value", "enterpriseValue", LabelKind::Number),
    ("Beta", "beta", LabelKind::Number),
    ("PE Ratio", "trailingPE", LabelKind::Number),
    ("Trailing P/E", "trailingPE", LabelKind::Number),
    ("Forward P/E", "forwardPE", LabelKind::Number),
    ("PEG Ratio", "pegRatio", LabelKind::Number),
    ("Price/Sales", "priceToSalesTrailing12Months", LabelKind::Number),
    ("Price/Book", "priceToBook", LabelKind::Number),
    ("EPS", "trailingEps", LabelKind::Number),
    ("Earnings Date", "earningsDate", LabelKind::Text),
    ("Forward Dividend & Yield", "dividendInfo", LabelKind::Dividend),
    ("Forward Annual Dividend Rate", "dividendRate", LabelKind::Number),
    ("Forward Annual Dividend Yield", "dividendYield", LabelKind::Percent),
    ("Payout Ratio", "payoutRatio", LabelKind::Percent),
    ("Ex-Dividend Date", "exDividendDate", LabelKind::Text),
    ("Last Split Factor", "lastSplitFactor", LabelKind::Text),
    ("Last Split Date", "lastSplitDate", LabelKind::Text),
    ("1y Target Est", "targetMeanPrice", LabelKind::Number),
    ("Profit Margin", "profitMargins", LabelKind::Percent),
    ("Operating Margin", "operatingMargins", LabelKind::Percent),
    ("Return on Assets", "returnOnAssets", LabelKind::Percent),
    ("Return on Equity", "returnOnEquity", LabelKind::Percent),
    ("Revenue Per Share", "revenuePerShare", LabelKind::Number),
    ("Quarterly Revenue Growth", "revenueGrowth", LabelKind::Percent),
    ("Quarterly Earnings Growth", "earningsGrowth", LabelKind::Percent),
    ("Revenue", "totalRevenue", LabelKind::Number),
    ("Gross Profit", "grossProfits", LabelKind::Number),
    ("EBITDA", "ebitda", LabelKind::Number),
    ("52 Week High", "fiftyTwoWeekHigh", LabelKind::Number),
    ("52 Week Low", "fiftyTwoWeekLow", LabelKind::Number),
    ("50-Day Moving Average", "fiftyDayAverage", LabelKind::Number),
    ("200-Day Moving Average", "twoHundredDayAverage", LabelKind::Number),
    ("Total Cash Per Share", "totalCashPerShare", LabelKind::Number),
    ("Total Cash", "totalCash", LabelKind::Number),
    ("Total Debt/Equity", "debtToEquity", LabelKind::Number),
    ("Total Debt", "totalDebt", LabelKind::Number),
    ("Current Ratio", "currentRatio", LabelKind::Number),
    ("Book Value Per Share", "bookValue", LabelKind::Number),
    ("Operating Cash Flow", "operatingCashflow", LabelKind::Number),
    ("Levered Free Cash Flow", "freeCashflow", LabelKind::Number),
    ("Mean", "targetMeanPrice", LabelKind::Number),
];

impl Facts {
    /// Reads `(label, value)` rows scraped from quote, statistics or analysis
    /// pages. Every fact is tagged [`Provenance::Scraped`]; for repeated keys
    /// the first row wins.
    pub fn from_label_rows(rows: &[(String, String)]) -> Self {
        let mut facts = Self::new();
        for (label, value) in rows {
            let value = value.trim();
            if value.is_empty() || value.contains("N/A") || value == "--" {
                continue;
            }
            let Some((_, key, kind)) = LABEL_KEYS
                .iter()
                .find(|(fragment, _, _)| label.contains(fragment))
            else {
                continue;
            };

            match kind {
                LabelKind::Number => {
                    if let Some(number) = crate::format::parse_display_number(value) {
                        facts.insert_scraped(key, FactValue::Number(number));
                    }
                }
                LabelKind::Percent => {
                    if let Some(number) = crate::format::parse_display_number(value) {
                        facts.insert_scraped(key, FactValue::Number(number / 100.0));
                    }
                }
                LabelKind::Text => facts.insert_scraped(key, FactValue::Text(value.to_string())),
                LabelKind::Dividend => {
                    let (rate, rest) = value.split_once('(').unwrap_or((value, ""));
                    if let Some(rate) = crate::format::parse_display_number(rate) {
                        facts.insert_scraped("dividendRate", FactValue::Number(rate));
                    }
                    if let Some(yield_pct) = crate::format::parse_display_number(rest) {
                        facts.insert_scraped("dividendYield", FactValue::Number(yield_pct / 100.0));
                    }
                }
            }
        }
        facts
    }

    fn insert_scraped(&mut self, key: &str, value: FactValue) {
        self.entries.entry(key.to_string()).or_insert(Fact {
            value,
            provenance: Provenance::Scraped,
        });
    }
}

fn leaf_value(field: &Value) -> Option<FactValue> {
    match field {
        Value::Number(number) => number.as_f64().map(FactValue::Number),
        Value::String(text) if !text.trim().is_empty() => Some(FactValue::Text(text.clone())),
        Value::Object(object) => {
            if let Some(raw) = object.get("raw").and_then(Value::as_f64) {
                return Some(FactValue::Number(raw));
            }
            object
                .get("fmt")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(|text| FactValue::Text(text.to_string()))
        }
        Value::Array(items) => items.first().and_then(leaf_value),
        _ => None,
    }
}

/// Numeric reading of a `{raw}` wrapper or bare number.
pub fn raw_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Object(object) => object.get("raw").and_then(Value::as_f64),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Display text of a `{fmt}` wrapper, bare string or number.
pub fn fmt_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(object) => object
            .get("fmt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| object.get("raw").and_then(Value::as_f64).map(|raw| raw.to_string())),
        _ => None,
    }
    .filter(|text| !text.trim().is_empty())
}
