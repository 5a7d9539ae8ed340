use std::collections::HashSet;

use crate::domain::symbol::is_derivative_ticker;

/// Upper bound on comparable tickers gathered per run.
pub const MAX_PEERS: usize = 10;
/// Entries (subject included) shown in the close-peer band.
pub const CLOSE_PEER_BAND: usize = 5;

/// Label fragments that mark index, futures or footer links.
const EXCLUDED_LABEL_KEYWORDS: &[&str] = &[
    "copyright",
    "future",
    "index",
    "dow jones",
    "s&p",
    "dax",
    "rights reserved",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PeerEsgEntry {
    pub ticker: String,
    pub company_name: String,
    pub total_esg_risk_score: Option<f64>,
    pub e_score: Option<f64>,
    pub s_score: Option<f64>,
    pub g_score: Option<f64>,
}

impl PeerEsgEntry {
    /// Entry with the ticker as its name and no scores.
    pub fn bare(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            company_name: ticker.to_string(),
            total_esg_risk_score: None,
            e_score: None,
            s_score: None,
            g_score: None,
        }
    }

    pub fn has_any_score(&self) -> bool {
        self.total_esg_risk_score.is_some()
            || self.e_score.is_some()
            || self.s_score.is_some()
            || self.g_score.is_some()
    }

    /// Reads up to four scores from scraped row cells: the numeric cells no
    /// greater than 100, with `--` holding a position as a missing score.
    pub fn with_scores_from_cells(mut self, cells: &[String]) -> Self {
        let scores: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.trim())
            .filter_map(|cell| {
                if cell == "--" {
                    return Some(None);
                }
                cell.parse::<f64>()
                    .ok()
                    .filter(|score| score.is_finite() && (0.0..=100.0).contains(score))
                    .map(Some)
            })
            .collect();
        let mut scores = scores.into_iter();
        self.total_esg_risk_score = scores.next().flatten();
        self.e_score = scores.next().flatten();
        self.s_score = scores.next().flatten();
        self.g_score = scores.next().flatten();
        self
    }
}

/// True for labels that name an index, futures contract or page footer.
pub fn is_excluded_label(label: &str) -> bool {
    let lowered = label.to_lowercase();
    EXCLUDED_LABEL_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Comparable companies; the subject ticker always occupies index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerSet {
    entries: Vec<PeerEsgEntry>,
}

impl PeerSet {
    /// Filters and deduplicates candidates, keeps at most [`MAX_PEERS`] of
    /// them, and places `subject` first.
    pub fn build(subject: PeerEsgEntry, candidates: Vec<PeerEsgEntry>) -> Self {
        let mut seen = HashSet::new();
        seen.insert(subject.ticker.to_ascii_uppercase());

        let peers = candidates
            .into_iter()
            .filter(|entry| !entry.ticker.trim().is_empty())
            .filter(|entry| !is_derivative_ticker(&entry.ticker))
            .filter(|entry| !is_excluded_label(&entry.company_name))
            .filter(|entry| seen.insert(entry.ticker.to_ascii_uppercase()))
            .take(MAX_PEERS);

        let entries = std::iter::once(subject).chain(peers).collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[PeerEsgEntry] {
        &self.entries
    }

    pub fn subject(&self) -> Option<&PeerEsgEntry> {
        self.entries.first()
    }

    /// The first [`CLOSE_PEER_BAND`] entries, subject included.
    pub fn close(&self) -> &[PeerEsgEntry] {
        &self.entries[..self.entries.len().min(CLOSE_PEER_BAND)]
    }

    /// Everything after the close-peer band.
    pub fn related(&self) -> &[PeerEsgEntry] {
        &self.entries[self.entries.len().min(CLOSE_PEER_BAND)..]
    }

    /// Number of comparable tickers, subject excluded.
    pub fn peer_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}
