//! Company summary quote grid.
//!
//! [`QuoteSummary::build`] renders sixteen quote fields in four columns from a
//! merged [`Facts`] map. Fields the provider did not publish are filled by
//! [`fill_estimates`], which only ever adds keys and tags everything it adds
//! as [`Provenance::Estimated`] or [`Provenance::Placeholder`].

use fastrand::Rng;

use crate::domain::date::CalendarDate;
use crate::domain::facts::{FactValue, Facts};
use crate::domain::profile::CompanyProfile;
use crate::domain::quality::{Provenance, Sourced};
use crate::format;

/// Tickers assumed to pay a dividend when the provider is silent.
pub const DIVIDEND_PAYERS: &[&str] = &["MSFT", "AAPL", "JNJ", "PG", "KO"];

pub const BETA_RANGE: (f64, f64) = (0.5, 2.5);
pub const EARNINGS_LEAD_DAYS: i64 = 90;
pub const EX_DIVIDEND_LEAD_DAYS: i64 = 30;
pub const BID_SIZE: f64 = 5_000.0;
pub const ASK_SIZE: f64 = 2_000.0;
pub const DAY_RANGE_BAND: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryField {
    pub label: &'static str,
    pub value: Sourced<String>,
}

/// Four columns of four labelled quote fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSummary {
    pub columns: Vec<Vec<SummaryField>>,
}

/// Quote grid plus profile, rendered together on one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySummary {
    pub quote: QuoteSummary,
    pub profile: CompanyProfile,
}

/// Best available last price.
pub fn reference_price(facts: &Facts) -> Option<f64> {
    first_number(
        facts,
        &[
            "regularMarketPrice",
            "currentPrice",
            "previousClose",
            "regularMarketPreviousClose",
            "chartPreviousClose",
        ],
    )
    .filter(|price| *price > 0.0)
}

/// `1 + ((high - low) / price - 0.3) * 2`, clamped to [`BETA_RANGE`].
pub fn estimate_beta(price: f64, low: f64, high: f64) -> f64 {
    let yearly_range = (high - low) / price;
    (1.0 + (yearly_range - 0.3) * 2.0).clamp(BETA_RANGE.0, BETA_RANGE.1)
}

pub fn is_tech_like(symbol: &str) -> bool {
    symbol.contains('T') || symbol == "AAPL" || symbol == "MSFT"
}

/// Plausible trailing P/E: 25–35 for tech-like tickers, 15–25 otherwise.
pub fn placeholder_pe(symbol: &str, rng: &mut Rng) -> f64 {
    let floor = if is_tech_like(symbol) { 25.0 } else { 15.0 };
    floor + rng.f64() * 10.0
}

pub fn placeholder_target(price: f64, rng: &mut Rng) -> f64 {
    price * (1.05 + rng.f64() * 0.10)
}

/// `(rate, yield)` with yield drawn from 1–3%.
pub fn placeholder_dividend(price: f64, rng: &mut Rng) -> (f64, f64) {
    let dividend_yield = 0.01 + rng.f64() * 0.02;
    (price * dividend_yield, dividend_yield)
}

pub fn is_dividend_payer(symbol: &str, facts: &Facts) -> bool {
    DIVIDEND_PAYERS.contains(&symbol)
        || facts.number("dividendRate").is_some_and(|rate| rate > 0.0)
        || facts.contains("dividendInfo")
}

/// Adds heuristic values for quote fields the provider left empty.
pub fn fill_estimates(facts: &mut Facts, symbol: &str, today: CalendarDate, rng: &mut Rng) {
    let has = |facts: &Facts, keys: &[&str]| keys.iter().any(|key| facts.contains(key));

    if let Some(price) = reference_price(facts) {
        if !has(facts, &["bid"]) {
            facts.insert_number("bid", price - 0.01, Provenance::Estimated);
            facts.insert_number("bidSize", BID_SIZE, Provenance::Estimated);
        }
        if !has(facts, &["ask"]) {
            facts.insert_number("ask", price + 0.01, Provenance::Estimated);
            facts.insert_number("askSize", ASK_SIZE, Provenance::Estimated);
        }
        if !has(facts, &["dayLow", "regularMarketDayLow", "dayRange"]) {
            facts.insert_number("dayLow", price * (1.0 - DAY_RANGE_BAND), Provenance::Estimated);
            facts.insert_number("dayHigh", price * (1.0 + DAY_RANGE_BAND), Provenance::Estimated);
        }
        if !facts.contains("marketCap") {
            if let Some(shares) = facts.number("sharesOutstanding") {
                facts.insert_number("marketCap", price * shares, Provenance::Estimated);
            }
        }
        if !facts.contains("beta") {
            if let (Some(low), Some(high)) = (
                facts.number("fiftyTwoWeekLow"),
                facts.number("fiftyTwoWeekHigh"),
            ) {
                facts.insert_number("beta", estimate_beta(price, low, high), Provenance::Estimated);
            }
        }
        if !facts.contains("trailingPE") {
            facts.insert_number("trailingPE", placeholder_pe(symbol, rng), Provenance::Placeholder);
        }
        if !facts.contains("trailingEps") {
            if let Some(pe) = facts.number("trailingPE").filter(|pe| *pe > 0.0) {
                facts.insert_number("trailingEps", price / pe, Provenance::Estimated);
            }
        }
        if !facts.contains("targetMeanPrice") {
            facts.insert_number(
                "targetMeanPrice",
                placeholder_target(price, rng),
                Provenance::Placeholder,
            );
        }
        if DIVIDEND_PAYERS.contains(&symbol) && !has(facts, &["dividendRate", "dividendInfo"]) {
            let (rate, dividend_yield) = placeholder_dividend(price, rng);
            facts.insert_number("dividendRate", rate, Provenance::Placeholder);
            facts.insert_number("dividendYield", dividend_yield, Provenance::Placeholder);
        }
    }

    if !facts.contains("earningsDate") {
        let earnings = today.plus_days(EARNINGS_LEAD_DAYS);
        facts.insert_text("earningsDate", earnings.to_long_string(), Provenance::Estimated);
    }
    if !facts.contains("exDividendDate") && is_dividend_payer(symbol, facts) {
        let earnings = date_fact(facts, "earningsDate").unwrap_or_else(|| today.plus_days(EARNINGS_LEAD_DAYS));
        let ex_dividend = earnings.plus_days(-EX_DIVIDEND_LEAD_DAYS);
        facts.insert_text("exDividendDate", ex_dividend.to_long_string(), Provenance::Estimated);
    }
}

impl QuoteSummary {
    pub fn build(facts: &Facts) -> Self {
        let columns = vec![
            vec![
                field("Previous Close", price_field(facts, &["previousClose", "regularMarketPreviousClose", "chartPreviousClose"])),
                field("Open", price_field(facts, &["open", "regularMarketOpen"])),
                field("Bid", depth_field(facts, "bid", "bidSize")),
                field("Ask", depth_field(facts, "ask", "askSize")),
            ],
            vec![
                field(
                    "Day's Range",
                    range_field(facts, ("dayLow", "dayHigh"), ("regularMarketDayLow", "regularMarketDayHigh"), "dayRange"),
                ),
                field(
                    "52 Week Range",
                    range_field(
                        facts,
                        ("fiftyTwoWeekLow", "fiftyTwoWeekHigh"),
                        ("fiftyTwoWeekLow", "fiftyTwoWeekHigh"),
                        "fiftyTwoWeekRange",
                    ),
                ),
                field("Volume", count_field(facts, &["volume", "regularMarketVolume"])),
                field("Avg. Volume", count_field(facts, &["averageVolume"])),
            ],
            vec![
                field(
                    "Market Cap (Intraday)",
                    render(facts, &["marketCap"], |value| format::magnitude(value, 3)),
                ),
                field("Beta (5Y Monthly)", render(facts, &["beta"], format::fixed2)),
                field("PE Ratio (TTM)", render(facts, &["trailingPE"], format::fixed2)),
                field("EPS (TTM)", render(facts, &["trailingEps"], format::fixed2)),
            ],
            vec![
                field("Earnings Date", date_field(facts, "earningsDate")),
                field("Forward Dividend & Yield", dividend_field(facts)),
                field("Ex-Dividend Date", date_field(facts, "exDividendDate")),
                field("1y Target Est", render(facts, &["targetMeanPrice"], format::fixed2)),
            ],
        ];
        Self { columns }
    }

    pub fn get(&self, label: &str) -> Option<&Sourced<String>> {
        self.columns
            .iter()
            .flatten()
            .find(|field| field.label == label)
            .map(|field| &field.value)
    }

    pub fn fields(&self) -> impl Iterator<Item = &SummaryField> {
        self.columns.iter().flatten()
    }
}

fn field(label: &'static str, value: Option<Sourced<String>>) -> SummaryField {
    SummaryField {
        label,
        value: value.unwrap_or_else(Sourced::not_available),
    }
}

fn first_number(facts: &Facts, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| facts.number(key))
}

fn first_key<'k>(facts: &Facts, keys: &[&'k str]) -> Option<&'k str> {
    keys.iter().copied().find(|key| facts.contains(key))
}

/// Numbers go through `render_number`; text facts are shown verbatim.
fn render(facts: &Facts, keys: &[&str], render_number: impl Fn(f64) -> String) -> Option<Sourced<String>> {
    let key = first_key(facts, keys)?;
    let fact = facts.get(key)?;
    let text = match &fact.value {
        FactValue::Number(value) => render_number(*value),
        FactValue::Text(text) => text.clone(),
    };
    Some(Sourced::new(text, fact.provenance))
}

fn price_field(facts: &Facts, keys: &[&str]) -> Option<Sourced<String>> {
    render(facts, keys, format::fixed2)
}

fn count_field(facts: &Facts, keys: &[&str]) -> Option<Sourced<String>> {
    render(facts, keys, format::thousands)
}

fn depth_field(facts: &Facts, price_key: &str, size_key: &str) -> Option<Sourced<String>> {
    let fact = facts.get(price_key)?;
    match &fact.value {
        FactValue::Text(text) => Some(Sourced::new(text.clone(), fact.provenance)),
        FactValue::Number(price) => {
            let size = facts.number(size_key).unwrap_or_default();
            Some(Sourced::new(format!("{price:.2} x {size:.0}"), fact.provenance))
        }
    }
}

fn range_field(
    facts: &Facts,
    keys: (&str, &str),
    alternate: (&str, &str),
    text_key: &str,
) -> Option<Sourced<String>> {
    let pair = |(low_key, high_key): (&str, &str)| {
        let low = facts.number(low_key)?;
        let high = facts.number(high_key)?;
        let provenance = worst(facts.provenance(low_key), facts.provenance(high_key));
        Some(Sourced::new(format!("{low:.2} - {high:.2}"), provenance))
    };

    pair(keys)
        .or_else(|| pair(alternate))
        .or_else(|| render(facts, &[text_key], format::fixed2))
}

fn date_fact(facts: &Facts, key: &str) -> Option<CalendarDate> {
    match &facts.get(key)?.value {
        FactValue::Number(seconds) => CalendarDate::from_epoch_seconds(*seconds as i64),
        FactValue::Text(text) => CalendarDate::parse_long(text),
    }
}

fn date_field(facts: &Facts, key: &str) -> Option<Sourced<String>> {
    let fact = facts.get(key)?;
    let text = match &fact.value {
        FactValue::Number(seconds) => CalendarDate::from_epoch_seconds(*seconds as i64)?.to_long_string(),
        FactValue::Text(text) => text.clone(),
    };
    Some(Sourced::new(text, fact.provenance))
}

fn dividend_field(facts: &Facts) -> Option<Sourced<String>> {
    match (facts.number("dividendRate"), facts.number("dividendYield")) {
        (Some(rate), Some(dividend_yield)) => Some(Sourced::new(
            format!("{rate:.2} ({})", format::percent(dividend_yield, false)),
            worst(facts.provenance("dividendRate"), facts.provenance("dividendYield")),
        )),
        (Some(rate), None) => Some(Sourced::new(
            format!("{rate:.2} (N/A)"),
            facts.provenance("dividendRate").unwrap_or(Provenance::Primary),
        )),
        _ => render(facts, &["dividendInfo"], format::fixed2),
    }
}

/// The less trustworthy of two provenances.
fn worst(a: Option<Provenance>, b: Option<Provenance>) -> Provenance {
    let rank = |provenance: Provenance| match provenance {
        Provenance::Primary => 0,
        Provenance::Scraped => 1,
        Provenance::Estimated => 2,
        Provenance::Default => 3,
        Provenance::Placeholder => 4,
    };
    let a = a.unwrap_or(Provenance::Primary);
    let b = b.unwrap_or(Provenance::Primary);
    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2025, 10, 17).expect("valid date")
    }

    #[test]
    fn beta_estimate_is_clamped() {
        assert!((estimate_beta(100.0, 80.0, 120.0) - 1.2).abs() < 1e-9);
        assert_eq!(estimate_beta(100.0, 10.0, 300.0), 2.5);
        assert_eq!(estimate_beta(100.0, 99.0, 100.0), 0.5);
    }

    #[test]
    fn placeholder_pe_band_depends_on_ticker() {
        let mut rng = Rng::with_seed(7);
        for _ in 0..50 {
            let tech = placeholder_pe("MSFT", &mut rng);
            assert!((25.0..=35.0).contains(&tech));
            let other = placeholder_pe("KO", &mut rng);
            assert!((15.0..=25.0).contains(&other));
        }
    }

    #[test]
    fn estimates_fill_only_missing_quote_fields() {
        let mut facts = Facts::new();
        facts.insert_number("regularMarketPrice", 200.0, Provenance::Primary);
        facts.insert_number("previousClose", 198.5, Provenance::Primary);
        facts.insert_number("beta", 1.1, Provenance::Primary);
        facts.insert_number("sharesOutstanding", 1_000_000_000.0, Provenance::Primary);

        fill_estimates(&mut facts, "AAPL", today(), &mut Rng::with_seed(1));
        let summary = QuoteSummary::build(&facts);

        assert_eq!(summary.get("Previous Close").map(Sourced::display).as_deref(), Some("198.50"));
        assert_eq!(summary.get("Beta (5Y Monthly)").map(Sourced::display).as_deref(), Some("1.10"));
        assert_eq!(
            summary.get("Bid").map(Sourced::display).as_deref(),
            Some("199.99 x 5000 (est.)")
        );
        assert_eq!(
            summary.get("Ask").map(Sourced::display).as_deref(),
            Some("200.01 x 2000 (est.)")
        );
        assert_eq!(
            summary.get("Day's Range").map(Sourced::display).as_deref(),
            Some("196.00 - 204.00 (est.)")
        );
        assert_eq!(
            summary.get("Market Cap (Intraday)").map(Sourced::display).as_deref(),
            Some("200.000B (est.)")
        );
        assert_eq!(
            summary.get("Earnings Date").map(Sourced::display).as_deref(),
            Some("Jan 15, 2026 (est.)")
        );
        assert_eq!(
            summary.get("Ex-Dividend Date").map(Sourced::display).as_deref(),
            Some("Dec 16, 2025 (est.)")
        );

        let pe = summary.get("PE Ratio (TTM)").expect("pe field");
        assert_eq!(pe.provenance, Provenance::Placeholder);
        let eps = summary.get("EPS (TTM)").expect("eps field");
        assert_eq!(eps.provenance, Provenance::Estimated);
        let dividend = summary.get("Forward Dividend & Yield").expect("dividend field");
        assert_eq!(dividend.provenance, Provenance::Placeholder);
    }

    #[test]
    fn without_a_price_fields_stay_not_available() {
        let mut facts = Facts::new();
        fill_estimates(&mut facts, "ZZZZ", today(), &mut Rng::with_seed(3));
        let summary = QuoteSummary::build(&facts);

        assert_eq!(summary.get("Bid").map(|v| v.value.as_str()), Some("N/A"));
        assert_eq!(summary.get("PE Ratio (TTM)").map(|v| v.provenance), Some(Provenance::Default));
        assert_eq!(summary.get("Ex-Dividend Date").map(|v| v.value.as_str()), Some("N/A"));
        assert_eq!(summary.get("PE Ratio (TTM)").map(Sourced::display).as_deref(), Some("N/A"));
        assert_eq!(summary.fields().count(), 16);
    }

    #[test]
    fn observed_dividend_and_dates_render_from_raw_values() {
        let mut facts = Facts::new();
        facts.insert_number("dividendRate", 1.04, Provenance::Primary);
        facts.insert_number("dividendYield", 0.0045, Provenance::Primary);
        // 2025-10-30T20:30:00Z
        facts.insert_number("earningsDate", 1_761_856_200.0, Provenance::Primary);
        facts.insert_text("fiftyTwoWeekRange", "164.08 - 260.10", Provenance::Scraped);

        let summary = QuoteSummary::build(&facts);

        assert_eq!(
            summary.get("Forward Dividend & Yield").map(Sourced::display).as_deref(),
            Some("1.04 (0.45%)")
        );
        assert_eq!(
            summary.get("Earnings Date").map(Sourced::display).as_deref(),
            Some("Oct 30, 2025")
        );
        assert_eq!(
            summary.get("52 Week Range").map(Sourced::display).as_deref(),
            Some("164.08 - 260.10")
        );
    }
}
