//! Category fetchers.
//!
//! Each submodule acquires one data category through its own fallback chain
//! and returns a [`FetchOutcome`]. Fetchers never return `Err`; every
//! failure ends up as [`FetchOutcome::Unavailable`].
//!
//! | Category | Module | Rank |
//! |----------|--------|------|
//! | Historical Data | [`history`] | 0 |
//! | ESG Scores | [`esg`] | 1 |
//! | Company Summary | [`summary`] | 2 |
//! | Statistics | [`statistics`] | 3 |
//! | Income Statement / Balance Sheet / Cash Flow | [`statements`] | 4–6 |
//! | Sustainability | [`sustainability`] | 7 |
//! | Peers | [`peers`] | 8 |

pub mod esg;
pub mod history;
pub mod peers;
pub mod statements;
pub mod statistics;
pub mod summary;
pub mod sustainability;

use std::fmt::{Display, Formatter};

use crate::config::AggregatorConfig;
use crate::domain::{
    CalendarDate, CompanySummary, EsgReport, KeyStatistics, PeerSet, PriceSeries, StatementKind,
    StatementTable, SustainabilityReport, Symbol,
};
use crate::fallback::{AttemptRecord, FetchOutcome, SourceTier, Unavailable};
use crate::yahoo::YahooClient;

/// Output categories in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    HistoricalData,
    EsgScores,
    CompanySummary,
    Statistics,
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    Sustainability,
    Peers,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::HistoricalData,
        Self::EsgScores,
        Self::CompanySummary,
        Self::Statistics,
        Self::IncomeStatement,
        Self::BalanceSheet,
        Self::CashFlow,
        Self::Sustainability,
        Self::Peers,
    ];

    /// Fixed output position of the category's sheet.
    pub const fn rank(self) -> usize {
        match self {
            Self::HistoricalData => 0,
            Self::EsgScores => 1,
            Self::CompanySummary => 2,
            Self::Statistics => 3,
            Self::IncomeStatement => 4,
            Self::BalanceSheet => 5,
            Self::CashFlow => 6,
            Self::Sustainability => 7,
            Self::Peers => 8,
        }
    }

    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::HistoricalData => "Historical Data",
            Self::EsgScores => "ESG Scores",
            Self::CompanySummary => "Company Summary",
            Self::Statistics => "Statistics",
            Self::IncomeStatement => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
            Self::Sustainability => "Sustainability",
            Self::Peers => "Peers",
        }
    }

    pub const fn for_statement(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Income => Self::IncomeStatement,
            StatementKind::Balance => Self::BalanceSheet,
            StatementKind::CashFlow => Self::CashFlow,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Everything a fetcher needs for one run.
pub struct FetchContext {
    pub client: YahooClient,
    pub symbol: Symbol,
    pub config: AggregatorConfig,
    pub today: CalendarDate,
}

impl FetchContext {
    pub fn new(client: YahooClient, symbol: Symbol, config: AggregatorConfig, today: CalendarDate) -> Self {
        Self {
            client,
            symbol,
            config,
            today,
        }
    }

    pub fn ticker(&self) -> &str {
        self.symbol.as_str()
    }
}

/// Typed outcome for one category.
#[derive(Debug, Clone)]
pub enum CategoryReport {
    History(FetchOutcome<PriceSeries>),
    Esg(FetchOutcome<EsgReport>),
    Summary(FetchOutcome<CompanySummary>),
    Statistics(FetchOutcome<KeyStatistics>),
    Statement(StatementKind, FetchOutcome<StatementTable>),
    Sustainability(FetchOutcome<SustainabilityReport>),
    Peers(FetchOutcome<PeerSet>),
}

impl CategoryReport {
    /// `Unavailable` report for `category`, used when its task never finished.
    pub fn unavailable(category: Category, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match category {
            Category::HistoricalData => Self::History(FetchOutcome::unavailable(reason)),
            Category::EsgScores => Self::Esg(FetchOutcome::unavailable(reason)),
            Category::CompanySummary => Self::Summary(FetchOutcome::unavailable(reason)),
            Category::Statistics => Self::Statistics(FetchOutcome::unavailable(reason)),
            Category::IncomeStatement => {
                Self::Statement(StatementKind::Income, FetchOutcome::unavailable(reason))
            }
            Category::BalanceSheet => {
                Self::Statement(StatementKind::Balance, FetchOutcome::unavailable(reason))
            }
            Category::CashFlow => {
                Self::Statement(StatementKind::CashFlow, FetchOutcome::unavailable(reason))
            }
            Category::Sustainability => Self::Sustainability(FetchOutcome::unavailable(reason)),
            Category::Peers => Self::Peers(FetchOutcome::unavailable(reason)),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::History(_) => Category::HistoricalData,
            Self::Esg(_) => Category::EsgScores,
            Self::Summary(_) => Category::CompanySummary,
            Self::Statistics(_) => Category::Statistics,
            Self::Statement(kind, _) => Category::for_statement(*kind),
            Self::Sustainability(_) => Category::Sustainability,
            Self::Peers(_) => Category::Peers,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::History(outcome) => outcome.is_success(),
            Self::Esg(outcome) => outcome.is_success(),
            Self::Summary(outcome) => outcome.is_success(),
            Self::Statistics(outcome) => outcome.is_success(),
            Self::Statement(_, outcome) => outcome.is_success(),
            Self::Sustainability(outcome) => outcome.is_success(),
            Self::Peers(outcome) => outcome.is_success(),
        }
    }

    /// Tier that produced the data, if any.
    pub fn tier(&self) -> Option<SourceTier> {
        match self {
            Self::History(outcome) => outcome.tier(),
            Self::Esg(outcome) => outcome.tier(),
            Self::Summary(outcome) => outcome.tier(),
            Self::Statistics(outcome) => outcome.tier(),
            Self::Statement(_, outcome) => outcome.tier(),
            Self::Sustainability(outcome) => outcome.tier(),
            Self::Peers(outcome) => outcome.tier(),
        }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::History(outcome) => outcome.attempts(),
            Self::Esg(outcome) => outcome.attempts(),
            Self::Summary(outcome) => outcome.attempts(),
            Self::Statistics(outcome) => outcome.attempts(),
            Self::Statement(_, outcome) => outcome.attempts(),
            Self::Sustainability(outcome) => outcome.attempts(),
            Self::Peers(outcome) => outcome.attempts(),
        }
    }

    /// The exhausted chain, when the category failed.
    pub fn unavailable_details(&self) -> Option<&Unavailable> {
        fn details<T>(outcome: &FetchOutcome<T>) -> Option<&Unavailable> {
            match outcome {
                FetchOutcome::Success(_) => None,
                FetchOutcome::Unavailable(unavailable) => Some(unavailable),
            }
        }
        match self {
            Self::History(outcome) => details(outcome),
            Self::Esg(outcome) => details(outcome),
            Self::Summary(outcome) => details(outcome),
            Self::Statistics(outcome) => details(outcome),
            Self::Statement(_, outcome) => details(outcome),
            Self::Sustainability(outcome) => details(outcome),
            Self::Peers(outcome) => details(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_sheet_order() {
        let ranks: Vec<usize> = Category::ALL.iter().map(|category| category.rank()).collect();
        assert_eq!(ranks, (0..9).collect::<Vec<_>>());
        assert_eq!(Category::ALL[4].sheet_name(), "Income Statement");
    }

    #[test]
    fn statement_kinds_map_to_consecutive_sheets() {
        let ranks: Vec<usize> = StatementKind::ALL
            .into_iter()
            .map(|kind| Category::for_statement(kind).rank())
            .collect();
        assert_eq!(ranks, vec![4, 5, 6]);
    }

    #[test]
    fn unavailable_reports_keep_their_category() {
        for category in Category::ALL {
            let report = CategoryReport::unavailable(category, "worker task failed");
            assert_eq!(report.category(), category);
            assert!(!report.is_success());
            assert_eq!(
                report.unavailable_details().map(|details| details.reason.as_str()),
                Some("worker task failed")
            );
        }
    }
}
