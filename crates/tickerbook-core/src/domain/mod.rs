//! # Domain Models
//!
//! Typed values assembled by the category fetchers and rendered by
//! [`crate::report`].
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercased ticker |
//! | [`CalendarDate`] | UTC calendar date rendered `dd-mm-yyyy` |
//! | [`PriceSeries`] | Daily OHLCV bars, newest first |
//! | [`EsgReport`] | Dated ESG records with observed/estimated tags |
//! | [`StatementTable`] | Aligned financial statement rows |
//! | [`CompanySummary`] | Quote grid plus [`CompanyProfile`] |
//! | [`KeyStatistics`] | Six titled statistic sections |
//! | [`SustainabilityReport`] | Controversy level and product involvement |
//! | [`PeerSet`] | Subject ticker followed by comparable companies |
//! | [`Facts`] | Flattened provider fields with per-fact [`Provenance`] |
//!
//! ## Provenance
//!
//! Values that were not observed carry a synthetic [`Provenance`]
//! (`Estimated`, `Placeholder`, `Default`) and render with a visible marker:
//!
//! ```rust
//! use tickerbook_core::{Provenance, Sourced};
//!
//! let beta = Sourced::new(String::from("1.20"), Provenance::Estimated);
//! assert_eq!(beta.display(), "1.20 (est.)");
//! ```

mod date;
mod esg;
mod facts;
mod history;
mod peers;
mod profile;
mod quality;
mod statement;
mod statistics;
mod summary;
mod sustainability;
mod symbol;

pub use date::{month_end_day, month_name, CalendarDate};
pub use esg::{
    valid_score, EsgComponents, EsgObservation, EsgRecord, EsgReport, COMPONENT_ESTIMATE_FRACTION,
};
pub use facts::{fmt_text, raw_number, Fact, FactValue, Facts};
pub use history::{PriceBar, PriceSeries};
pub use peers::{is_excluded_label, PeerEsgEntry, PeerSet, CLOSE_PEER_BAND, MAX_PEERS};
pub use profile::{fiscal_year_end_label, CompanyProfile};
pub use quality::{DataQuality, Provenance, Sourced, NOT_AVAILABLE};
pub use statement::{
    MetricSpec, StatementKind, StatementPeriod, StatementRow, StatementTable, BALANCE_METRICS,
    CASH_FLOW_METRICS, INCOME_METRICS,
};
pub use statistics::{KeyStatistics, StatKind, StatRow, StatSection, StatSpec, STAT_SECTIONS};
pub use summary::{
    estimate_beta, fill_estimates, is_dividend_payer, is_tech_like, placeholder_dividend,
    placeholder_pe, placeholder_target, reference_price, CompanySummary, QuoteSummary,
    SummaryField, DIVIDEND_PAYERS,
};
pub use sustainability::{
    is_involvement_value, is_noise_label, split_involvement, ControversyLevel, Involvement,
    SustainabilityReport, INVOLVEMENT_AREAS, INVOLVEMENT_FLAGS,
};
pub use symbol::{is_derivative_ticker, Symbol};
