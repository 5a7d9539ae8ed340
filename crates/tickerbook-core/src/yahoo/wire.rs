//! Wire shapes for the provider's structured endpoints.

use serde::Deserialize;
use serde_json::Value;

/// Numeric field that arrives either bare (`12.3`) or wrapped
/// (`{"raw": 12.3, "fmt": "12.30"}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Plain(f64),
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
    },
    Other(Value),
}

impl RawNumber {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Plain(value) => Some(*value),
            Self::Wrapped { raw } => *raw,
            Self::Other(_) => None,
        }
        .filter(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "chartPreviousClose", default)]
    pub chart_previous_close: Option<f64>,
    #[serde(rename = "regularMarketDayHigh", default)]
    pub day_high: Option<f64>,
    #[serde(rename = "regularMarketDayLow", default)]
    pub day_low: Option<f64>,
    #[serde(rename = "fiftyTwoWeekHigh", default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "fiftyTwoWeekLow", default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(rename = "regularMarketVolume", default)]
    pub regular_market_volume: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsgChartResponse {
    #[serde(rename = "esgChart")]
    pub esg_chart: EsgChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsgChartEnvelope {
    #[serde(default)]
    pub result: Vec<EsgChartResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsgChartResult {
    #[serde(rename = "symbolSeries", default)]
    pub symbol_series: Option<EsgSeries>,
    #[serde(rename = "instrumentInfo", default)]
    pub instrument_info: Option<InstrumentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsgSeries {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(rename = "esgScore", default)]
    pub esg_score: Vec<Option<f64>>,
    #[serde(rename = "environmentScore", default)]
    pub environment_score: Vec<Option<f64>>,
    #[serde(rename = "socialScore", default)]
    pub social_score: Vec<Option<f64>>,
    #[serde(rename = "governanceScore", default)]
    pub governance_score: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrumentInfo {
    #[serde(rename = "esgScores", default)]
    pub esg_scores: Option<EsgScores>,
}

/// `esgScores` object shared by the ESG chart, page store and quoteSummary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsgScores {
    #[serde(rename = "totalEsg", default)]
    pub total_esg: Option<RawNumber>,
    #[serde(rename = "environmentScore", default)]
    pub environment_score: Option<RawNumber>,
    #[serde(rename = "socialScore", default)]
    pub social_score: Option<RawNumber>,
    #[serde(rename = "governanceScore", default)]
    pub governance_score: Option<RawNumber>,
    #[serde(rename = "highestControversy", default)]
    pub highest_controversy: Option<RawNumber>,
    #[serde(rename = "controversyLevel", default)]
    pub controversy_level: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    pub finance: RecommendationsFinance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsFinance {
    #[serde(default)]
    pub result: Vec<RecommendationsResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResult {
    #[serde(rename = "recommendedSymbols", default)]
    pub recommended_symbols: Vec<RecommendedSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedSymbol {
    pub symbol: String,
}
