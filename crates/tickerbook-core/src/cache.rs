//! Per-run page cache keyed by source URL.
//!
//! Several categories read the same provider page (the sustainability page
//! feeds ESG, sustainability flags and peers). Each URL is fetched at most once
//! per run: concurrent callers for the same key wait on a single in-flight
//! fetch, and failures are remembered for the rest of the run as well.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::source_error::SourceError;

type Slot = Arc<OnceCell<Result<Arc<str>, SourceError>>>;

/// Thread-safe, single-flight body cache for one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct PageCache {
    inner: Arc<RwLock<HashMap<String, Slot>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached body for `key`, running `fetch` only if no caller
    /// has populated the key yet.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<str>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, SourceError>>,
    {
        let slot = self.slot(key).await;
        slot.get_or_init(|| async move { fetch().await.map(Arc::from) })
            .await
            .clone()
    }

    /// Cached outcome for `key`, if a fetch has completed.
    pub async fn peek(&self, key: &str) -> Option<Result<Arc<str>, SourceError>> {
        let store = self.inner.read().await;
        store.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of keys seen this run, including in-flight ones.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, key: &str) -> Slot {
        {
            let store = self.inner.read().await;
            if let Some(slot) = store.get(key) {
                return Arc::clone(slot);
            }
        }

        let mut store = self.inner.write().await;
        Arc::clone(store.entry(key.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_cache_returns_stored_body_without_refetching() {
        let cache = PageCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let body = cache
                .get_or_fetch("https://example.test/a", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(String::from("page-a"))
                })
                .await
                .expect("fetch succeeds");
            assert_eq!(&*body, "page-a");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_concurrent_callers_share_one_fetch() {
        let cache = PageCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |cache: PageCache, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch("https://example.test/slow", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok(String::from("slow"))
                })
                .await
        };

        let (first, second) = tokio::join!(
            fetch(cache.clone(), Arc::clone(&calls)),
            fetch(cache.clone(), Arc::clone(&calls))
        );

        assert_eq!(&*first.expect("first"), "slow");
        assert_eq!(&*second.expect("second"), "slow");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_remembers_failures_for_the_run() {
        let cache = PageCache::new();

        let first = cache
            .get_or_fetch("https://example.test/down", || async {
                Err(SourceError::status(503, "https://example.test/down"))
            })
            .await;
        let second = cache
            .get_or_fetch("https://example.test/down", || async {
                Ok(String::from("recovered"))
            })
            .await;

        assert!(first.is_err());
        assert_eq!(second, first);
        assert!(matches!(cache.peek("https://example.test/down").await, Some(Err(_))));
    }

    #[tokio::test]
    async fn test_cache_keys_are_independent() {
        let cache = PageCache::new();
        let a = cache
            .get_or_fetch("a", || async { Ok(String::from("A")) })
            .await
            .expect("a");
        let b = cache
            .get_or_fetch("b", || async { Ok(String::from("B")) })
            .await
            .expect("b");

        assert_eq!((&*a, &*b), ("A", "B"));
        assert!(cache.peek("c").await.is_none());
    }
}
