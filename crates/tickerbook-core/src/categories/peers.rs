//! Peer ESG comparison.
//!
//! Candidates come from the first tier that yields any; the subject's own row
//! is fetched separately and always leads the set.

use serde_json::Value;
use tracing::debug;

use crate::categories::{Category, FetchContext};
use crate::domain::{
    fmt_text, is_derivative_ticker, raw_number, valid_score, PeerEsgEntry, PeerSet, MAX_PEERS,
};
use crate::fallback::{FallbackChain, FetchOutcome, SourceTier};
use crate::scrape;
use crate::source_error::SourceError;
use crate::yahoo::{Page, PEER_MODULES};

const PEERS_HEADING: &str = "ESG Risk Score for Peers";

pub async fn fetch(ctx: &FetchContext) -> FetchOutcome<PeerSet> {
    let candidates = FallbackChain::new(Category::Peers.sheet_name())
        .attempt(SourceTier::HtmlTable, "sustainability page peers", from_page_section(ctx))
        .attempt(SourceTier::EmbeddedJson, "script peers json", from_page_script(ctx))
        .attempt(SourceTier::Library, "recommendations endpoint", from_recommendations(ctx))
        .run()
        .await;

    let fetched = match candidates {
        FetchOutcome::Success(fetched) => fetched,
        FetchOutcome::Unavailable(unavailable) => return FetchOutcome::Unavailable(unavailable),
    };

    let subject = match peer_from_modules(ctx, ctx.ticker()).await {
        Ok(entry) => entry,
        Err(error) => {
            debug!(symbol = %ctx.symbol, error = %error, "subject peer row falls back to bare ticker");
            PeerEsgEntry::bare(ctx.ticker())
        }
    };
    FetchOutcome::Success(fetched).map(|candidates| PeerSet::build(subject, candidates))
}

async fn from_page_section(ctx: &FetchContext) -> Result<Vec<PeerEsgEntry>, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Sustainability).await?;
    non_empty(ctx, peers_from_section(&html))
}

async fn from_page_script(ctx: &FetchContext) -> Result<Vec<PeerEsgEntry>, SourceError> {
    let html = ctx.client.page(ctx.ticker(), Page::Sustainability).await?;
    non_empty(ctx, peers_from_script(&html))
}

async fn from_recommendations(ctx: &FetchContext) -> Result<Vec<PeerEsgEntry>, SourceError> {
    let symbols = ctx.client.recommendations(ctx.ticker()).await?;
    let mut entries = Vec::new();
    for symbol in symbols
        .iter()
        .filter(|symbol| !is_derivative_ticker(symbol) && !symbol.eq_ignore_ascii_case(ctx.ticker()))
        .take(MAX_PEERS)
    {
        match peer_from_modules(ctx, symbol).await {
            Ok(entry) => entries.push(entry),
            Err(error) => debug!(peer = %symbol, error = %error, "skipping peer without quoteSummary"),
        }
    }
    non_empty(ctx, entries)
}

async fn peer_from_modules(ctx: &FetchContext, symbol: &str) -> Result<PeerEsgEntry, SourceError> {
    let result = ctx.client.quote_summary(symbol, PEER_MODULES).await?;
    Ok(entry_from_modules(symbol, &result))
}

fn non_empty(ctx: &FetchContext, entries: Vec<PeerEsgEntry>) -> Result<Vec<PeerEsgEntry>, SourceError> {
    let entries: Vec<PeerEsgEntry> = entries
        .into_iter()
        .filter(|entry| !entry.ticker.eq_ignore_ascii_case(ctx.ticker()))
        .collect();
    if entries.is_empty() {
        return Err(SourceError::absent("no comparable tickers published"));
    }
    Ok(entries)
}

/// Linked rows of the "ESG Risk Score for Peers" section that carry at
/// least one score.
pub fn peers_from_section(html: &str) -> Vec<PeerEsgEntry> {
    scrape::quote_links_in_section(html, PEERS_HEADING)
        .into_iter()
        .map(|row| {
            let name = if row.label.is_empty() || row.label.eq_ignore_ascii_case(&row.ticker) {
                row.cells
                    .iter()
                    .find(|cell| !cell.eq_ignore_ascii_case(&row.ticker) && cell.parse::<f64>().is_err() && cell.as_str() != "--")
                    .cloned()
                    .unwrap_or_else(|| row.ticker.clone())
            } else {
                row.label.clone()
            };
            PeerEsgEntry {
                company_name: name,
                ..PeerEsgEntry::bare(&row.ticker)
            }
            .with_scores_from_cells(&row.cells)
        })
        .filter(PeerEsgEntry::has_any_score)
        .collect()
}

/// Objects of an inline `"peers": [...]` array.
pub fn peers_from_script(html: &str) -> Vec<PeerEsgEntry> {
    scrape::script_peer_objects(html)
        .iter()
        .filter_map(|object| {
            let ticker = object
                .get("symbol")
                .or_else(|| object.get("ticker"))
                .and_then(Value::as_str)?
                .trim()
                .to_ascii_uppercase();
            let name = ["name", "shortName", "longName"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| ticker.clone());
            let score = |keys: &[&str]| valid_score(keys.iter().find_map(|key| object.get(*key).and_then(raw_number)));

            Some(PeerEsgEntry {
                company_name: name,
                total_esg_risk_score: score(&["esgScore", "totalEsg"]),
                e_score: score(&["environmentScore", "envScore"]),
                s_score: score(&["socialScore"]),
                g_score: score(&["governanceScore", "govScore"]),
                ..PeerEsgEntry::bare(&ticker)
            })
        })
        .collect()
}

/// A peer row from quoteSummary `price` and `esgScores` modules.
pub fn entry_from_modules(symbol: &str, result: &Value) -> PeerEsgEntry {
    let name = ["/price/longName", "/price/shortName"]
        .iter()
        .find_map(|pointer| result.pointer(pointer).and_then(fmt_text))
        .unwrap_or_else(|| symbol.to_string());
    let score = |key: &str| {
        valid_score(
            result
                .get("esgScores")
                .and_then(|scores| scores.get(key))
                .and_then(raw_number),
        )
    };

    PeerEsgEntry {
        company_name: name,
        total_esg_risk_score: score("totalEsg"),
        e_score: score("environmentScore"),
        s_score: score("socialScore"),
        g_score: score("governanceScore"),
        ..PeerEsgEntry::bare(symbol)
    }
}
