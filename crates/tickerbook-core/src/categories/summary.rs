//! Company summary and profile.
//!
//! Facts are merged in priority order: quoteSummary info modules and the
//! five-day chart, then label rows scraped from the quote, key-statistics and
//! analysis pages, then heuristics for whatever quote fields remain empty.

use fastrand::Rng;

use crate::categories::{Category, FetchContext};
use crate::domain::{fill_estimates, CompanyProfile, CompanySummary, Facts, Provenance, QuoteSummary};
use crate::fallback::{AttemptLog, FetchOutcome, SourceTier};
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::{ChartWindow, Page, INFO_MODULES};

/// Quote fields whose absence sends the fetcher on to the statistics and
/// analysis pages.
const KEY_QUOTE_FIELDS: &[&str] = &["marketCap", "beta", "trailingPE", "trailingEps", "targetMeanPrice"];

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<CompanySummary> {
    let mut log = AttemptLog::new(Category::CompanySummary.sheet_name());

    let mut facts = match library_facts(ctx).await {
        Ok(facts) => {
            log.record_success(SourceTier::Library, "quoteSummary info modules");
            facts
        }
        Err(error) => {
            log.record_failure(SourceTier::Library, "quoteSummary info modules", error);
            Facts::new()
        }
    };
    let observed_primary = !facts.is_empty();

    let mut scraped_any = false;
    for (page, source) in [
        (Page::Quote, "quote page rows"),
        (Page::KeyStatistics, "key-statistics page rows"),
        (Page::Analysis, "analysis page rows"),
    ] {
        if page != Page::Quote && KEY_QUOTE_FIELDS.iter().all(|key| facts.contains(key)) {
            break;
        }
        match scraped_facts(ctx, page).await {
            Ok(scraped) => {
                log.record_success(SourceTier::HtmlTable, source);
                scraped_any = true;
                facts.fill_from(scraped);
            }
            Err(error) => log.record_failure(SourceTier::HtmlTable, source, error),
        }
    }

    let mut profile = CompanyProfile::defaults(ctx.ticker());
    profile.apply_facts(&facts);
    if profile.sector.provenance == Provenance::Default || profile.description.provenance == Provenance::Default {
        match profile_page(ctx).await {
            Ok((pairs, description)) => {
                profile.apply_scraped(&pairs);
                if let Some(description) = description {
                    profile.apply_scraped_description(&description);
                }
                log.record_success(SourceTier::HtmlTable, "profile page");
            }
            Err(error) => log.record_failure(SourceTier::HtmlTable, "profile page", error),
        }
    }

    if !observed_primary && !scraped_any && !profile.has_observed() {
        return log.fail(format!("no company data published for {}", ctx.symbol));
    }

    let before = facts.len();
    let mut rng = Rng::new();
    fill_estimates(&mut facts, ctx.ticker(), ctx.today, &mut rng);
    let estimated = facts.len() - before;

    let tier = if observed_primary {
        SourceTier::Library
    } else {
        SourceTier::HtmlTable
    };
    let source = if observed_primary {
        "quoteSummary info modules"
    } else {
        "quote page rows"
    };

    let mut outcome = log.succeed(
        CompanySummary {
            quote: QuoteSummary::build(&facts),
            profile,
        },
        tier,
        source,
    );
    if estimated > 0 {
        if let FetchOutcome::Success(fetched) = &mut outcome {
            fetched
                .warnings
                .push(format!("{estimated} quote field(s) filled by estimate or placeholder"));
        }
    }
    outcome
}

/// quoteSummary info modules plus the five-day chart's meta block.
pub(crate) async fn library_facts(ctx: &FetchContext) -> Result<Facts, SourceError> {
    let result = ctx.client.quote_summary(ctx.ticker(), INFO_MODULES).await?;
    let mut facts = Facts::from_quote_summary(&result);

    if let Ok(chart) = ctx.client.chart(ctx.ticker(), ChartWindow::RecentDays).await {
        let meta = chart.meta;
        let mut chart_facts = Facts::new();
        for (key, value) in [
            ("regularMarketPrice", meta.regular_market_price),
            ("chartPreviousClose", meta.chart_previous_close),
            ("regularMarketDayHigh", meta.day_high),
            ("regularMarketDayLow", meta.day_low),
            ("fiftyTwoWeekHigh", meta.fifty_two_week_high),
            ("fiftyTwoWeekLow", meta.fifty_two_week_low),
            ("regularMarketVolume", meta.regular_market_volume),
        ] {
            if let Some(value) = value {
                chart_facts.insert_number(key, value, Provenance::Primary);
            }
        }
        facts.fill_from(chart_facts);
    }

    if facts.is_empty() {
        return Err(SourceError::absent("quoteSummary info modules are empty"));
    }
    Ok(facts)
}

/// Label rows of a rendered page as scraped facts.
pub(crate) async fn scraped_facts(ctx: &FetchContext, page: Page) -> Result<Facts, SourceError> {
    let html = ctx.client.page(ctx.ticker(), page).await?;
    let scope = (page == Page::Quote).then_some("#quote-summary");
    let facts = Facts::from_label_rows(&scrape::label_value_rows(&html, scope));
    if facts.is_empty() {
        return Err(SourceError::parse(format!("no recognised rows on the {page:?} page")));
    }
    Ok(facts)
}

async fn profile_page(ctx: &FetchContext) -> Result<(Vec<(String, String)>, Option<String>), SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Profile).await?;
    let parsed = profile_from_page(&html);
    if parsed.0.is_empty() && parsed.1.is_none() {
        return Err(SourceError::parse("profile page has no sector, industry or description"));
    }
    Ok(parsed)
}

/// `(label, value)` pairs and the business description from the profile page.
pub fn profile_from_page(html: &str) -> (Vec<(String, String)>, Option<String>) {
    let mut pairs = Vec::new();
    for label in ["Sector(s)", "Industry", "Full Time Employees", "Fiscal Year Ends"] {
        if let Some(value) = scrape::texts_following(html, label, 1).into_iter().next() {
            pairs.push((label.to_string(), value));
        }
    }

    let description = scrape::select_texts(html, "section[data-testid='description'] p")
        .into_iter()
        .next()
        .or_else(|| scrape::texts_following(html, "Description", 1).into_iter().next());

    (pairs, description)
}
