//! Cookie/crumb handshake for the provider's JSON endpoints.
//!
//! The session cookie comes from `fc.yahoo.com` (kept by the transport's
//! cookie jar); the crumb from `/v1/test/getcrumb` on either query host. The
//! crumb is cached with a TTL and refreshed under a lock so concurrent
//! categories trigger at most one handshake. A failed handshake is cached too
//! and not retried until [`CRUMB_RETRY_BACKOFF`] has passed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest};
use crate::source_error::SourceError;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CRUMB_TTL: Duration = Duration::from_secs(3_600);
/// Time a failed handshake is remembered before the next attempt.
pub const CRUMB_RETRY_BACKOFF: Duration = Duration::from_secs(300);
const MAX_CRUMB_LEN: usize = 100;

#[derive(Debug, Clone)]
enum CrumbState {
    Ready { value: String, fetched_at: Instant },
    Failed { error: SourceError, failed_at: Instant },
}

/// Crumb cache shared by every request of a client.
#[derive(Debug, Clone, Default)]
pub struct CrumbManager {
    state: Arc<Mutex<Option<CrumbState>>>,
}

impl CrumbManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid crumb, performing the handshake when none is cached or the
    /// cached one expired. A recent failure is returned without any request.
    pub async fn crumb(&self, http: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
        let mut state = self.state.lock().await;
        match state.as_ref() {
            Some(CrumbState::Ready { value, fetched_at }) if fetched_at.elapsed() < CRUMB_TTL => {
                return Ok(value.clone());
            }
            Some(CrumbState::Failed { error, failed_at }) if failed_at.elapsed() < CRUMB_RETRY_BACKOFF => {
                return Err(error.clone());
            }
            _ => {}
        }

        match fetch_crumb(http, timeout_ms).await {
            Ok(value) => {
                *state = Some(CrumbState::Ready {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(value)
            }
            Err(error) => {
                debug!(error = %error, "crumb handshake failed; backing off");
                *state = Some(CrumbState::Failed {
                    error: error.clone(),
                    failed_at: Instant::now(),
                });
                Err(error)
            }
        }
    }

    /// Drops the cached crumb so the next call performs a new handshake.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }
}

async fn fetch_crumb(http: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_browser_headers()
        .with_timeout_ms(timeout_ms);
    // fc.yahoo.com answers 404 while still setting the session cookie.
    http.execute(cookie_request).await.map_err(|e| {
        SourceError::transport(format!("failed to fetch session cookie: {}", e.message()))
    })?;

    for url in CRUMB_URLS {
        let request = HttpRequest::get(url)
            .with_browser_headers()
            .with_timeout_ms(timeout_ms);

        let response = match http.execute(request).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(url, status = response.status, "crumb endpoint rejected request");
                continue;
            }
            Err(error) => {
                debug!(url, error = %error, "crumb endpoint unreachable");
                continue;
            }
        };

        let body = response.body.trim();
        if body.to_ascii_lowercase().contains("too many requests") {
            return Err(SourceError::status(429, url));
        }
        if is_plausible_crumb(body) {
            return Ok(body.to_string());
        }
    }

    Err(SourceError::absent("no crumb endpoint returned a usable crumb"))
}

fn is_plausible_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < MAX_CRUMB_LEN
        && !body.contains(' ')
        && !body.contains('<')
}
