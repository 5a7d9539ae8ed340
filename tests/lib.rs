//! Shared fixtures for tickerbook behavior tests: a routing HTTP mock and
//! canned provider payloads.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tickerbook_core::categories::FetchContext;
use tickerbook_core::cache::PageCache;
use tickerbook_core::yahoo::YahooClient;
use tickerbook_core::{
    AggregatorConfig, CalendarDate, HttpClient, HttpError, HttpRequest, HttpResponse, Symbol,
};

/// Answers each request with the first route whose pattern the URL
/// contains; crumb requests get a fixed crumb and anything else a 404.
#[derive(Default)]
pub struct RoutingHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<String>>,
}

impl RoutingHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, body: impl Into<String>) -> Self {
        self.routes.push((pattern.to_string(), Ok(HttpResponse::ok(body))));
        self
    }

    pub fn status(mut self, pattern: &str, status: u16) -> Self {
        self.routes
            .push((pattern.to_string(), Ok(HttpResponse::with_status(status, ""))));
        self
    }

    pub fn timeout(mut self, pattern: &str) -> Self {
        self.routes
            .push((pattern.to_string(), Err(HttpError::timeout("request timed out"))));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .clone()
    }

    pub fn request_count(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, HttpError> {
        if url.contains("getcrumb") {
            return Ok(HttpResponse::ok("testcrumb"));
        }
        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")))
    }
}

impl HttpClient for RoutingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .push(request.url.clone());
        let response = self.respond(&request.url);
        Box::pin(async move { response })
    }
}

pub fn today() -> CalendarDate {
    CalendarDate::from_ymd(2026, 10, 19).expect("valid date")
}

pub fn context(http: Arc<RoutingHttpClient>, ticker: &str) -> FetchContext {
    let config = AggregatorConfig::default();
    let client = YahooClient::new(http, PageCache::new(), &config);
    FetchContext::new(client, Symbol::parse(ticker).expect("valid symbol"), config, today())
}

pub const CHART_HISTORY: &str = r#"{"chart": {"result": [{
    "meta": {"regularMarketPrice": 190.5},
    "timestamp": [1704292200, 1704378600, 1704465000],
    "indicators": {"quote": [{
        "open": [184.2, 182.1, 181.9],
        "high": [185.9, 183.1, 182.8],
        "low": [183.4, 180.9, 180.2],
        "close": [184.3, 181.9, 181.2],
        "volume": [58414500, 71983600, 62303300]
    }]}
}], "error": null}}"#;

pub const ESG_CHART: &str = r#"{"esgChart": {"result": [{
    "symbolSeries": {
        "timestamp": [1696118400, 1698796800],
        "esgScore": [17.1, 16.9],
        "environmentScore": [0.6, 0.5],
        "socialScore": [7.3, 7.2],
        "governanceScore": [9.2, 9.2]
    },
    "instrumentInfo": {"esgScores": {"totalEsg": {"raw": 16.9}, "highestControversy": {"raw": 3}}}
}]}}"#;

pub const STATEMENT_MODULES: &str = r#"{"quoteSummary": {"result": [{
    "incomeStatementHistory": {"incomeStatementHistory": [
        {"endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
         "totalRevenue": {"raw": 383290000000, "fmt": "383.29B"},
         "netIncome": {"raw": 97000000000, "fmt": "97B"}},
        {"endDate": {"raw": 1664496000, "fmt": "2022-09-30"},
         "totalRevenue": {"raw": 394330000000, "fmt": "394.33B"},
         "netIncome": {"raw": 99800000000, "fmt": "99.8B"}}
    ]}
}], "error": null}}"#;

pub const RECOMMENDATIONS: &str = r#"{"finance": {"result": [{"recommendedSymbols": [
    {"symbol": "MSFT"}, {"symbol": "^GSPC"}, {"symbol": "ES=F"}, {"symbol": "GOOGL"}
]}]}}"#;

pub fn peer_modules(name: &str, total: f64) -> String {
    format!(
        r#"{{"quoteSummary": {{"result": [{{
            "price": {{"longName": "{name}"}},
            "esgScores": {{"totalEsg": {{"raw": {total}}}, "environmentScore": {{"raw": 1.5}}}}
        }}], "error": null}}}}"#
    )
}
