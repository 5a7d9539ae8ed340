//! Ordered fallback acquisition.
//!
//! A [`FallbackChain`] holds the strategies for one data category in priority
//! order. [`FallbackChain::run`] awaits them one at a time and stops at the
//! first success. Every attempt is logged as an [`AttemptRecord`]; when all
//! strategies fail the outcome is [`FetchOutcome::Unavailable`] and carries the
//! last error.
//!
//! ```rust,ignore
//! let outcome = FallbackChain::new("Income Statement")
//!     .attempt(SourceTier::EmbeddedJson, "financials page json", from_page_json(&ctx))
//!     .attempt(SourceTier::HtmlTable, "financials page table", from_page_table(&ctx))
//!     .attempt(SourceTier::Library, "quoteSummary statements", from_modules(&ctx))
//!     .run()
//!     .await;
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use tracing::{debug, warn};

use crate::source_error::SourceError;

/// Kind of strategy, in the order chains usually try them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceTier {
    Api,
    EmbeddedJson,
    HtmlTable,
    Library,
    Estimate,
    Placeholder,
}

impl SourceTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::EmbeddedJson => "embedded_json",
            Self::HtmlTable => "html_table",
            Self::Library => "library",
            Self::Estimate => "estimate",
            Self::Placeholder => "placeholder",
        }
    }
}

impl Display for SourceTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One strategy invocation and its failure, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub tier: SourceTier,
    pub source: String,
    pub error: Option<SourceError>,
}

/// Successful acquisition with its diagnostics.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub tier: SourceTier,
    pub source: String,
    pub attempts: Vec<AttemptRecord>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

/// Exhausted chain with the last error retained.
#[derive(Debug, Clone)]
pub struct Unavailable {
    pub reason: String,
    pub last_error: Option<SourceError>,
    pub attempts: Vec<AttemptRecord>,
    pub latency_ms: u64,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            last_error: None,
            attempts: Vec::new(),
            latency_ms: 0,
        }
    }
}

/// Result of every category acquisition. Never an `Err`.
#[derive(Debug, Clone)]
pub enum FetchOutcome<T> {
    Success(Fetched<T>),
    Unavailable(Unavailable),
}

impl<T> FetchOutcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(Unavailable::new(reason))
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(fetched) => Some(&fetched.data),
            Self::Unavailable(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(fetched) => Some(fetched.data),
            Self::Unavailable(_) => None,
        }
    }

    pub fn tier(&self) -> Option<SourceTier> {
        match self {
            Self::Success(fetched) => Some(fetched.tier),
            Self::Unavailable(_) => None,
        }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::Success(fetched) => &fetched.attempts,
            Self::Unavailable(unavailable) => &unavailable.attempts,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            Self::Success(fetched) => FetchOutcome::Success(Fetched {
                data: f(fetched.data),
                tier: fetched.tier,
                source: fetched.source,
                attempts: fetched.attempts,
                warnings: fetched.warnings,
                latency_ms: fetched.latency_ms,
            }),
            Self::Unavailable(unavailable) => FetchOutcome::Unavailable(unavailable),
        }
    }
}

/// Attempt bookkeeping shared by [`FallbackChain`] and categories that merge
/// several strategies instead of stopping at the first.
#[derive(Debug)]
pub struct AttemptLog {
    category: &'static str,
    started: Instant,
    attempts: Vec<AttemptRecord>,
}

impl AttemptLog {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            started: Instant::now(),
            attempts: Vec::new(),
        }
    }

    pub fn record_success(&mut self, tier: SourceTier, source: &str) {
        self.attempts.push(AttemptRecord {
            tier,
            source: source.to_string(),
            error: None,
        });
    }

    pub fn record_failure(&mut self, tier: SourceTier, source: &str, error: SourceError) {
        debug!(
            category = self.category,
            tier = tier.as_str(),
            source,
            error = %error,
            "source attempt failed"
        );
        self.attempts.push(AttemptRecord {
            tier,
            source: source.to_string(),
            error: Some(error),
        });
    }

    pub fn failed_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.error.is_some())
            .count()
    }

    pub fn succeed<T>(self, data: T, tier: SourceTier, source: &str) -> FetchOutcome<T> {
        let failed = self.failed_count();
        let mut warnings = Vec::new();
        if failed > 0 {
            let warning = format!(
                "fallback succeeded with '{source}' after {failed} failed attempt(s)"
            );
            warn!(category = self.category, tier = tier.as_str(), "{warning}");
            warnings.push(warning);
        }

        FetchOutcome::Success(Fetched {
            data,
            tier,
            source: source.to_string(),
            attempts: self.attempts,
            warnings,
            latency_ms: elapsed_ms(self.started),
        })
    }

    pub fn fail<T>(self, reason: impl Into<String>) -> FetchOutcome<T> {
        let reason = reason.into();
        let last_error = self
            .attempts
            .iter()
            .rev()
            .find_map(|attempt| attempt.error.clone());
        warn!(
            category = self.category,
            attempts = self.attempts.len(),
            last_error = last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            "{reason}"
        );

        FetchOutcome::Unavailable(Unavailable {
            reason,
            last_error,
            attempts: self.attempts,
            latency_ms: elapsed_ms(self.started),
        })
    }
}

type AttemptFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

struct Step<'a, T> {
    tier: SourceTier,
    source: &'static str,
    future: AttemptFuture<'a, T>,
}

/// Ordered list of strategies for one category.
pub struct FallbackChain<'a, T> {
    category: &'static str,
    steps: Vec<Step<'a, T>>,
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            steps: Vec::new(),
        }
    }

    /// Appends a strategy. Futures are lazy, so later strategies do no work
    /// unless every earlier one failed.
    pub fn attempt<F>(mut self, tier: SourceTier, source: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T, SourceError>> + Send + 'a,
    {
        self.steps.push(Step {
            tier,
            source,
            future: Box::pin(future),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(self) -> FetchOutcome<T> {
        let mut log = AttemptLog::new(self.category);

        for step in self.steps {
            match step.future.await {
                Ok(data) => {
                    log.record_success(step.tier, step.source);
                    return log.succeed(data, step.tier, step.source);
                }
                Err(error) => log.record_failure(step.tier, step.source, error),
            }
        }

        if log.attempts.is_empty() {
            return log.fail(format!("no sources configured for {}", self.category));
        }
        log.fail(format!("all sources failed for {}", self.category))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_successful_strategy_wins() {
        let outcome = FallbackChain::new("test")
            .attempt(SourceTier::Api, "api", async { Ok(1) })
            .attempt(SourceTier::Library, "library", async { Ok(2) })
            .run()
            .await;

        assert_eq!(outcome.data(), Some(&1));
        assert_eq!(outcome.tier(), Some(SourceTier::Api));
        assert_eq!(outcome.attempts().len(), 1);
    }

    #[tokio::test]
    async fn later_strategy_runs_after_failures_and_warns() {
        let outcome = FallbackChain::new("test")
            .attempt(SourceTier::Api, "api", async {
                Err(SourceError::status(500, "https://example.test"))
            })
            .attempt(SourceTier::EmbeddedJson, "json", async {
                Err(SourceError::parse("no store"))
            })
            .attempt(SourceTier::Library, "library", async { Ok("rows") })
            .run()
            .await;

        let FetchOutcome::Success(fetched) = outcome else {
            panic!("chain should succeed on the library tier");
        };
        assert_eq!(fetched.tier, SourceTier::Library);
        assert_eq!(fetched.attempts.len(), 3);
        assert_eq!(
            fetched.warnings,
            vec![String::from(
                "fallback succeeded with 'library' after 2 failed attempt(s)"
            )]
        );
    }

    #[tokio::test]
    async fn exhausted_chain_retains_last_error() {
        let outcome: FetchOutcome<u8> = FallbackChain::new("ESG Scores")
            .attempt(SourceTier::Api, "api", async {
                Err(SourceError::transport("timeout"))
            })
            .attempt(SourceTier::Library, "library", async {
                Err(SourceError::absent("no esgScores module"))
            })
            .run()
            .await;

        let FetchOutcome::Unavailable(unavailable) = outcome else {
            panic!("chain should be unavailable");
        };
        assert_eq!(unavailable.reason, "all sources failed for ESG Scores");
        assert_eq!(
            unavailable.last_error,
            Some(SourceError::absent("no esgScores module"))
        );
        assert_eq!(unavailable.attempts.len(), 2);
    }

    #[tokio::test]
    async fn strategies_after_success_are_never_polled() {
        let polled = std::sync::atomic::AtomicBool::new(false);
        let outcome = FallbackChain::new("test")
            .attempt(SourceTier::Api, "api", async { Ok(()) })
            .attempt(SourceTier::Placeholder, "placeholder", async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(outcome.is_success());
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn map_preserves_diagnostics() {
        let outcome = AttemptLog::new("test").succeed(2_u32, SourceTier::HtmlTable, "table");
        let mapped = outcome.map(|value| value * 10);
        assert_eq!(mapped.data(), Some(&20));
        assert_eq!(mapped.tier(), Some(SourceTier::HtmlTable));
    }
}
