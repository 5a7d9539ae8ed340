//! Key statistics: quoteSummary info modules, then the key-statistics and
//! analysis page rows for whatever the modules left empty.

use crate::categories::summary::{library_facts, scraped_facts};
use crate::categories::{Category, FetchContext};
use crate::domain::{Facts, KeyStatistics};
use crate::fallback::{AttemptLog, FetchOutcome, SourceTier};
use crate::yahoo::Page;

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<KeyStatistics> {
    let mut log = AttemptLog::new(Category::Statistics.sheet_name());
    let mut facts = Facts::new();
    let mut first_tier: Option<(SourceTier, &'static str)> = None;

    match library_facts(ctx).await {
        Ok(primary) => {
            log.record_success(SourceTier::Library, "quoteSummary info modules");
            facts = primary;
            first_tier = Some((SourceTier::Library, "quoteSummary info modules"));
        }
        Err(error) => log.record_failure(SourceTier::Library, "quoteSummary info modules", error),
    }

    for (page, source) in [
        (Page::KeyStatistics, "key-statistics page rows"),
        (Page::Analysis, "analysis page rows"),
    ] {
        match scraped_facts(ctx, page).await {
            Ok(scraped) => {
                log.record_success(SourceTier::HtmlTable, source);
                first_tier.get_or_insert((SourceTier::HtmlTable, source));
                facts.fill_from(scraped);
            }
            Err(error) => log.record_failure(SourceTier::HtmlTable, source, error),
        }
    }

    let statistics = KeyStatistics::from_facts(&facts);
    match first_tier {
        Some((tier, source)) if statistics.populated() > 0 => log.succeed(statistics, tier, source),
        _ => log.fail(format!("no key statistics published for {}", ctx.symbol)),
    }
}
