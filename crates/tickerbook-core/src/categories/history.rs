//! Daily price history: chart endpoint, then the history page table.

use time::OffsetDateTime;

use crate::categories::{Category, FetchContext};
use crate::domain::{CalendarDate, PriceBar, PriceSeries};
use crate::fallback::{FallbackChain, FetchOutcome, SourceTier};
use crate::format::parse_display_number;
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::{ChartResult, ChartWindow, Page};

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60 + 6 * 60 * 60;

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<PriceSeries> {
    FallbackChain::new(Category::HistoricalData.sheet_name())
        .attempt(SourceTier::Api, "chart endpoint", from_chart(ctx))
        .attempt(SourceTier::HtmlTable, "history page table", from_history_page(ctx))
        .run()
        .await
}

async fn from_chart(ctx: &FetchContext) -> Result<PriceSeries, SourceError> {
    let period2 = OffsetDateTime::now_utc().unix_timestamp();
    let period1 = period2 - i64::from(ctx.config.lookback_years) * SECONDS_PER_YEAR;
    let chart = ctx
        .client
        .chart(ctx.ticker(), ChartWindow::Between { period1, period2 })
        .await?;
    non_empty(bars_from_chart(&chart))
}

async fn from_history_page(ctx: &FetchContext) -> Result<PriceSeries, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::History).await?;
    non_empty(bars_from_history_table(&html)?)
}

fn non_empty(bars: Vec<PriceBar>) -> Result<PriceSeries, SourceError> {
    let series = PriceSeries::from_bars(bars);
    if series.is_empty() {
        return Err(SourceError::absent("no daily price bars"));
    }
    Ok(series)
}

/// Zips chart timestamps with the first quote block. Rows without a full
/// OHLC set (dividend and split events) are dropped.
pub fn bars_from_chart(chart: &ChartResult) -> Vec<PriceBar> {
    let Some(quote) = chart.indicators.quote.first() else {
        return Vec::new();
    };
    let at = |column: &[Option<f64>], index: usize| column.get(index).copied().flatten();

    chart
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(index, timestamp)| {
            Some(PriceBar {
                date: CalendarDate::from_epoch_seconds(*timestamp)?,
                open: at(&quote.open, index)?,
                high: at(&quote.high, index)?,
                low: at(&quote.low, index)?,
                close: at(&quote.close, index)?,
                volume: at(&quote.volume, index),
            })
        })
        .collect()
}

/// Reads the history page's price table. Dividend and split rows span fewer
/// cells and are skipped.
pub fn bars_from_history_table(html: &str) -> Result<Vec<PriceBar>, SourceError> {
    let table = scrape::tables(html)
        .into_iter()
        .find(|table| {
            let headers = table.headers.join(" ").to_lowercase();
            headers.contains("date") && headers.contains("close")
        })
        .ok_or_else(|| SourceError::parse("history page has no price table"))?;

    let bars = table
        .rows
        .iter()
        .filter(|row| row.len() >= 5)
        .filter_map(|row| {
            Some(PriceBar {
                date: CalendarDate::parse_long(&row[0]).or_else(|| CalendarDate::parse_header(&row[0]))?,
                open: parse_display_number(&row[1])?,
                high: parse_display_number(&row[2])?,
                low: parse_display_number(&row[3])?,
                close: parse_display_number(&row[4])?,
                volume: row.get(6).and_then(|cell| parse_display_number(cell)),
            })
        })
        .collect();
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_rows_without_prices_are_dropped() {
        let chart: ChartResult = serde_json::from_str(
            r#"{
                "meta": {"regularMarketPrice": 3.0},
                "timestamp": [1704292200, 1704378600, 1704465000],
                "indicators": {"quote": [{
                    "open": [1.0, null, 3.0],
                    "high": [1.5, null, 3.5],
                    "low": [0.5, null, 2.5],
                    "close": [1.2, null, 3.2],
                    "volume": [100, null, null]
                }]}
            }"#,
        )
        .expect("chart json");

        let series = PriceSeries::from_bars(bars_from_chart(&chart));

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].date.to_string(), "05-01-2024");
        assert_eq!(series.bars()[0].volume, None);
        assert_eq!(series.bars()[1].volume, Some(100.0));
    }

    #[test]
    fn history_table_skips_dividend_rows() {
        let html = r#"
            <table>
              <thead><tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th><th>Adj Close</th><th>Volume</th></tr></thead>
              <tbody>
                <tr><td>Oct 17, 2025</td><td>248.02</td><td>253.38</td><td>247.27</td><td>252.29</td><td>252.29</td><td>49,147,000</td></tr>
                <tr><td>Aug 11, 2025</td><td>0.26 Dividend</td></tr>
                <tr><td>Oct 16, 2025</td><td>248.25</td><td>249.04</td><td>245.13</td><td>247.45</td><td>247.45</td><td>39,777,000</td></tr>
              </tbody>
            </table>"#;

        let bars = bars_from_history_table(html).expect("price table");

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 252.29);
        assert_eq!(bars[0].volume, Some(49_147_000.0));
    }

    #[test]
    fn page_without_price_table_is_a_parse_error() {
        let error = bars_from_history_table("<p>nothing</p>").expect_err("no table");
        assert_eq!(error.code(), "source.parse");
    }
}
