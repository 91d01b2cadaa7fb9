//! Upstream data providers.
//!
//! The service layer only sees the two traits below, so tests and alternative
//! feeds plug in without touching scoring or HTTP code.

pub mod backtest;
pub mod investing;

pub use backtest::StaticBacktestProvider;
pub use investing::InvestingClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::types::{BacktestSummary, HistoryRequest, RawPriceRecord, StockInfo};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::ExternalApi(err.to_string())
    }
}

/// Raw daily bars for one instrument over a date window.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Vec<RawPriceRecord>, SourceError>;
}

/// Externally computed backtest results, keyed by instrument code.
///
/// `Ok(None)` means no backtest exists for the code.
#[async_trait]
pub trait BacktestProvider: Send + Sync {
    async fn summary(&self, code: &str) -> Result<Option<BacktestSummary>, SourceError>;
}

/// Ticker or name lookup restricted to Indonesian listings.
#[async_trait]
pub trait SymbolSearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<StockInfo>, SourceError>;
}
