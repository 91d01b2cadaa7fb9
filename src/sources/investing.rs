//! Investing.com historical data client.
//!
//! Fetches daily OHLCV rows for IDX instruments from the public
//! `financialdata/historical` endpoint and resolves tickers to upstream codes
//! through `search/v2/search`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PriceHistoryProvider, SourceError, SymbolSearchProvider};
use crate::config::Config;
use crate::types::{HistoryRequest, RawPriceRecord, StockInfo};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const RETRY_BACKOFF_MS: u64 = 500;
const INDONESIA_FLAG: &str = "Indonesia";

/// Response envelope. Rows stay untyped until each one is converted.
#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    data: Option<Vec<Value>>,
}

/// One historical row. Accepts both the upstream field names and the plain
/// `date/open/high/low/close/volume` shape.
#[derive(Debug, Deserialize)]
struct InvestingRow {
    #[serde(alias = "rowDateTimestamp", alias = "date")]
    row_date: Option<String>,
    #[serde(alias = "last_openRaw", alias = "open")]
    open: Option<Value>,
    #[serde(alias = "last_maxRaw", alias = "high")]
    high: Option<Value>,
    #[serde(alias = "last_minRaw", alias = "low")]
    low: Option<Value>,
    #[serde(alias = "last_closeRaw", alias = "close")]
    close: Option<Value>,
    #[serde(alias = "volumeRaw", alias = "volume")]
    volume: Option<Value>,
}

/// Numbers arrive as JSON numbers or as strings with thousands separators.
/// Anything else becomes NaN so the normalizer drops the row.
fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.replace(',', "").trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

impl InvestingRow {
    fn into_record(self) -> RawPriceRecord {
        RawPriceRecord::new(
            self.row_date.unwrap_or_default(),
            number(self.open.as_ref()),
            number(self.high.as_ref()),
            number(self.low.as_ref()),
            number(self.close.as_ref()),
            number(self.volume.as_ref()),
        )
    }
}

/// Parse a response body into raw records.
pub fn parse_history(body: &str) -> Result<Vec<RawPriceRecord>, SourceError> {
    let response: HistoricalResponse = serde_json::from_str(body)?;
    let rows = response
        .data
        .ok_or_else(|| SourceError::InvalidResponse("response has no data field".to_string()))?;

    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<InvestingRow>(row)
                .map(InvestingRow::into_record)
                .map_err(SourceError::from)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<Value>,
}

/// Ids arrive as numbers or strings.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a search body, keeping only Indonesian listings that carry an id.
pub fn parse_search(body: &str) -> Result<Vec<StockInfo>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    Ok(response
        .quotes
        .iter()
        .filter(|quote| quote.get("flag").and_then(Value::as_str) == Some(INDONESIA_FLAG))
        .filter_map(|quote| {
            let code = text(quote.get("id"));
            if code.is_empty() {
                warn!("Skipping search result without id: {}", quote);
                return None;
            }
            Some(StockInfo {
                code,
                symbol: text(quote.get("symbol")),
                name: text(quote.get("name")),
                flag: INDONESIA_FLAG.to_string(),
                exchange: text(quote.get("exchange")),
            })
        })
        .collect())
}

/// Transport failures and 5xx responses may succeed on a later attempt.
/// Client errors and malformed bodies will not.
fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(_) => true,
        SourceError::Status(status) => *status >= 500,
        _ => false,
    }
}

/// Investing.com API client.
pub struct InvestingClient {
    client: Client,
    base_url: String,
    retries: u32,
}

impl InvestingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert("domain-id", HeaderValue::from_static("id"));
        headers.insert(REFERER, HeaderValue::from_static("https://investing.com"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://investing.com"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Self::new(
            config.investing_base_url.clone(),
            Duration::from_secs(config.investing_timeout_secs),
            config.investing_retries,
        )
    }

    async fn fetch_once(&self, request: &HistoryRequest) -> Result<Vec<RawPriceRecord>, SourceError> {
        let url = format!("{}/financialdata/historical/{}", self.base_url, request.code);
        let start = request.start_date.to_string();
        let end = request.end_date.to_string();

        debug!("Fetching Investing history: {} {}..{}", request.code, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("start-date", start.as_str()),
                ("end-date", end.as_str()),
                ("time-frame", request.time_frame.as_str()),
                ("add-missing-rows", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_history(&body)
    }

    async fn search_once(&self, query: &str) -> Result<Vec<StockInfo>, SourceError> {
        let url = format!("{}/search/v2/search", self.base_url);
        debug!("Searching Investing symbols: {}", query);

        let response = self.client.get(&url).query(&[("q", query)]).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_search(&body)
    }

    /// Run `op` until it succeeds, fails for good, or retries run out.
    async fn with_retries<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(
                        "Investing request for {} failed (attempt {}/{}): {}",
                        label, attempt, self.retries, err
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for InvestingClient {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Vec<RawPriceRecord>, SourceError> {
        self.with_retries(&request.code, || self.fetch_once(request)).await
    }
}

#[async_trait]
impl SymbolSearchProvider for InvestingClient {
    async fn search(&self, query: &str) -> Result<Vec<StockInfo>, SourceError> {
        self.with_retries(query, || self.search_once(query)).await
    }
}
