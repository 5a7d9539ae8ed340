//! Controversy level and product involvement.

use serde_json::Value;

use crate::categories::{Category, FetchContext};
use crate::domain::{
    is_involvement_value, raw_number, split_involvement, ControversyLevel, SustainabilityReport,
    INVOLVEMENT_AREAS, INVOLVEMENT_FLAGS,
};
use crate::fallback::{FallbackChain, FetchOutcome, SourceTier};
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::{Page, ESG_MODULES};

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<SustainabilityReport> {
    FallbackChain::new(Category::Sustainability.sheet_name())
        .attempt(SourceTier::HtmlTable, "sustainability page", from_page(ctx))
        .attempt(SourceTier::Library, "quoteSummary esgScores", from_modules(ctx))
        .run()
        .await
}

async fn from_page(ctx: &FetchContext) -> Result<SustainabilityReport, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Sustainability).await?;
    non_empty(report_from_page(&html))
}

async fn from_modules(ctx: &FetchContext) -> Result<SustainabilityReport, SourceError> {
    let result = ctx.client.quote_summary(ctx.ticker(), ESG_MODULES).await?;
    let scores = result
        .get("esgScores")
        .ok_or_else(|| SourceError::absent("quoteSummary has no esgScores module"))?;
    non_empty(report_from_scores(scores))
}

fn non_empty(report: SustainabilityReport) -> Result<SustainabilityReport, SourceError> {
    if report.is_empty() {
        return Err(SourceError::absent("no controversy level or product involvement published"));
    }
    Ok(report)
}

/// Reads the rendered sustainability page.
///
/// Involvement comes from `Category: value` spans under the "Product
/// Involvement" heading; when none split cleanly, each known area is looked
/// up next to its own label.
pub fn report_from_page(html: &str) -> SustainabilityReport {
    let mut report = SustainabilityReport {
        controversy_level: scrape::texts_following(html, "Controversy Level", 5)
            .iter()
            .chain(scrape::select_texts(html, "[aria-label*='ontroversy']").iter())
            .find_map(|text| ControversyLevel::find_in(text)),
        involvements: Vec::new(),
    };

    for text in scrape::section_span_texts(html, "Product Involvement") {
        if let Some((category, value)) = split_involvement(&text) {
            report.push_involvement(category, value);
        }
    }

    if report.involvements.is_empty() {
        for area in INVOLVEMENT_AREAS {
            if let Some(value) = scrape::texts_following(html, area, 2)
                .into_iter()
                .find(|text| is_involvement_value(text))
            {
                report.push_involvement(area, &value);
            }
        }
    }

    report
}

/// Reads an `esgScores` module: `highestControversy` and the boolean
/// involvement flags.
pub fn report_from_scores(scores: &Value) -> SustainabilityReport {
    let mut report = SustainabilityReport {
        controversy_level: scores
            .get("highestControversy")
            .and_then(raw_number)
            .and_then(ControversyLevel::from_highest_controversy),
        involvements: Vec::new(),
    };

    for (area, key) in INVOLVEMENT_FLAGS {
        if let Some(flag) = scores.get(*key).and_then(Value::as_bool) {
            report.push_involvement(area, if flag { "Yes" } else { "No" });
        }
    }

    report
}
