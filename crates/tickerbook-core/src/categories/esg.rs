//! ESG scores.
//!
//! Unlike the other categories, the ESG tiers accumulate: the series comes
//! from the first tier that publishes one, and each component score is taken
//! from the first tier that publishes it. The chain stops early once both a
//! series and a complete snapshot are known.

use serde_json::Value;

use crate::categories::{Category, FetchContext};
use crate::domain::{ControversyLevel, EsgComponents, EsgObservation, EsgReport};
use crate::fallback::{AttemptLog, FetchOutcome, SourceTier};
use crate::format::parse_display_number;
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::wire::EsgSeries;
use crate::yahoo::{EsgChartResult, EsgScores, Page, ESG_MODULES};

/// What one tier contributed.
#[derive(Debug, Default)]
struct Partial {
    series: Vec<EsgObservation>,
    components: EsgComponents,
}

impl Partial {
    fn is_empty(&self) -> bool {
        self.series.is_empty()
            && !self.components.has_any_score()
            && self.components.controversy_level.is_none()
    }
}

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<EsgReport> {
    let category = Category::EsgScores.sheet_name();
    let mut log = AttemptLog::new(category);
    let mut series: Vec<EsgObservation> = Vec::new();
    let mut snapshot = EsgComponents::default();
    let mut total_source: Option<(SourceTier, &'static str)> = None;

    let tiers: [(SourceTier, &'static str); 4] = [
        (SourceTier::Api, "esgChart endpoint"),
        (SourceTier::EmbeddedJson, "sustainability page json"),
        (SourceTier::HtmlTable, "sustainability page scores"),
        (SourceTier::Library, "quoteSummary esgScores"),
    ];

    for (tier, source) in tiers {
        if !series.is_empty() && snapshot.is_complete() {
            break;
        }

        let attempt = match tier {
            SourceTier::Api => from_esg_chart(ctx).await,
            SourceTier::EmbeddedJson => from_page_json(ctx).await,
            SourceTier::HtmlTable => from_page_scores(ctx).await,
            _ => from_modules(ctx).await,
        };

        match attempt {
            Ok(partial) => {
                let had_total = snapshot.total.is_some() || !series.is_empty();
                if series.is_empty() {
                    series = partial.series;
                }
                snapshot.fill_from(partial.components);
                if !had_total && (snapshot.total.is_some() || !series.is_empty()) {
                    total_source = Some((tier, source));
                }
                log.record_success(tier, source);
            }
            Err(error) => log.record_failure(tier, source, error),
        }
    }

    match (EsgReport::build(series, snapshot, ctx.today), total_source) {
        (Some(report), Some((tier, source))) if !report.records.is_empty() => {
            log.succeed(report, tier, source)
        }
        _ => log.fail(format!("no ESG data published for {}", ctx.symbol)),
    }
}

async fn from_esg_chart(ctx: &FetchContext) -> Result<Partial, SourceError> {
    let result = ctx.client.esg_chart(ctx.ticker()).await?;
    non_empty(partial_from_chart(&result))
}

async fn from_page_json(ctx: &FetchContext) -> Result<Partial, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Sustainability).await?;
    let store = scrape::quote_summary_store(&html)?;
    non_empty(partial_from_store(&store))
}

async fn from_page_scores(ctx: &FetchContext) -> Result<Partial, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Sustainability).await?;
    non_empty(Partial {
        series: Vec::new(),
        components: components_from_page(&html),
    })
}

async fn from_modules(ctx: &FetchContext) -> Result<Partial, SourceError> {
    let result = ctx.client.quote_summary(ctx.ticker(), ESG_MODULES).await?;
    let scores = result
        .get("esgScores")
        .ok_or_else(|| SourceError::absent("quoteSummary has no esgScores module"))?;
    let scores: EsgScores = serde_json::from_value(scores.clone())?;
    non_empty(Partial {
        series: Vec::new(),
        components: components_from_scores(&scores),
    })
}

fn non_empty(partial: Partial) -> Result<Partial, SourceError> {
    if partial.is_empty() {
        return Err(SourceError::absent("no ESG scores published"));
    }
    Ok(partial)
}

fn partial_from_chart(result: &EsgChartResult) -> Partial {
    Partial {
        series: result
            .symbol_series
            .as_ref()
            .map(observations_from_series)
            .unwrap_or_default(),
        components: result
            .instrument_info
            .as_ref()
            .and_then(|info| info.esg_scores.as_ref())
            .map(components_from_scores)
            .unwrap_or_default(),
    }
}

fn partial_from_store(store: &Value) -> Partial {
    let components = store
        .get("esgScores")
        .and_then(|scores| serde_json::from_value::<EsgScores>(scores.clone()).ok())
        .map(|scores| components_from_scores(&scores))
        .unwrap_or_default();
    let series = store
        .get("esgChart")
        .and_then(|chart| serde_json::from_value::<EsgChartResult>(chart.clone()).ok())
        .map(|chart| partial_from_chart(&chart).series)
        .unwrap_or_default();
    Partial { series, components }
}

/// Zips the series timestamps with each score column.
pub fn observations_from_series(series: &EsgSeries) -> Vec<EsgObservation> {
    let at = |column: &[Option<f64>], index: usize| column.get(index).copied().flatten();
    series
        .timestamp
        .iter()
        .enumerate()
        .map(|(index, timestamp)| EsgObservation {
            timestamp: *timestamp,
            total: at(&series.esg_score, index),
            environmental: at(&series.environment_score, index),
            social: at(&series.social_score, index),
            governance: at(&series.governance_score, index),
        })
        .collect()
}

pub fn components_from_scores(scores: &EsgScores) -> EsgComponents {
    let value = |number: &Option<crate::yahoo::RawNumber>| number.as_ref().and_then(|n| n.value());
    let controversy_level = match &scores.controversy_level {
        Some(Value::String(level)) if !level.trim().is_empty() => Some(level.clone()),
        _ => value(&scores.highest_controversy)
            .and_then(ControversyLevel::from_highest_controversy)
            .map(|level| level.as_str().to_string()),
    };

    EsgComponents {
        total: value(&scores.total_esg),
        environmental: value(&scores.environment_score),
        social: value(&scores.social_score),
        governance: value(&scores.governance_score),
        controversy_level,
    }
    .sanitized()
}

/// Scores shown on the rendered sustainability page.
pub fn components_from_page(html: &str) -> EsgComponents {
    let first_number = |texts: Vec<String>| texts.iter().find_map(|text| leading_number(text));

    let total = first_number(scrape::select_texts(html, "div[data-test='esg-score']"))
        .or_else(|| first_number(scrape::texts_following(html, "Total ESG Risk score", 3)));
    let controversy_level = scrape::texts_following(html, "Controversy Level", 5)
        .iter()
        .chain(scrape::select_texts(html, "div[aria-label*='Controversy']").iter())
        .find_map(|text| ControversyLevel::find_in(text))
        .map(|level| level.as_str().to_string());

    EsgComponents {
        total,
        environmental: first_number(scrape::texts_following(html, "Environment Risk Score", 3)),
        social: first_number(scrape::texts_following(html, "Social Risk Score", 3)),
        governance: first_number(scrape::texts_following(html, "Governance Risk Score", 3)),
        controversy_level,
    }
    .sanitized()
}

fn leading_number(text: &str) -> Option<f64> {
    text.split_whitespace().next().and_then(parse_display_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_result_yields_series_and_snapshot() {
        let result: EsgChartResult = serde_json::from_str(
            r#"{
                "symbolSeries": {
                    "timestamp": [1600000000, 1700000000],
                    "esgScore": [16.0, 17.2],
                    "governanceScore": [null, 9.3]
                },
                "instrumentInfo": {"esgScores": {
                    "totalEsg": {"raw": 17.2},
                    "environmentScore": {"raw": 0.5},
                    "socialScore": 7.4,
                    "governanceScore": {"raw": 9.3},
                    "highestControversy": 3
                }}
            }"#,
        )
        .expect("esg chart json");

        let partial = partial_from_chart(&result);

        assert_eq!(partial.series.len(), 2);
        assert_eq!(partial.series[1].governance, Some(9.3));
        assert_eq!(partial.components.social, Some(7.4));
        assert!(partial.components.is_complete());
        assert_eq!(partial.components.controversy_level.as_deref(), Some("Significant"));
    }

    #[test]
    fn page_scores_are_read_next_to_their_labels() {
        let html = r#"
            <div><span>Total ESG Risk score</span><div>22.4</div></div>
            <div><span>Environment Risk Score</span><span>1.9</span></div>
            <div><span>Social Risk Score</span><span>11.2 Medium</span></div>
            <div><span>Controversy Level</span><span>Moderate controversy</span></div>"#;

        let components = components_from_page(html);

        assert_eq!(components.total, Some(22.4));
        assert_eq!(components.environmental, Some(1.9));
        assert_eq!(components.social, Some(11.2));
        assert_eq!(components.governance, None);
        assert_eq!(components.controversy_level.as_deref(), Some("Moderate"));
    }

    #[test]
    fn out_of_range_module_scores_are_dropped() {
        let scores: EsgScores =
            serde_json::from_str(r#"{"totalEsg": {"raw": 140.0}, "socialScore": {"raw": 5.0}}"#)
                .expect("scores json");
        let components = components_from_scores(&scores);
        assert_eq!(components.total, None);
        assert_eq!(components.social, Some(5.0));
    }
}
