//! Ticker search and code resolution for Indonesian listings.

use std::sync::Arc;
use tracing::{debug, info};

use super::cache::{CacheStats, TtlCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::sources::SymbolSearchProvider;
use crate::types::{SearchResults, StockInfo, StockLookup};

const MAX_QUERY_LEN: usize = 50;

pub struct SymbolService {
    provider: Arc<dyn SymbolSearchProvider>,
    matches: TtlCache<Vec<StockInfo>>,
}

impl SymbolService {
    pub fn new(provider: Arc<dyn SymbolSearchProvider>, matches: TtlCache<Vec<StockInfo>>) -> Self {
        Self { provider, matches }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn SymbolSearchProvider>) -> Self {
        Self::new(provider, TtlCache::from_config(config))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.matches.stats()
    }

    pub fn purge_expired(&self) -> usize {
        self.matches.purge_expired()
    }

    /// Indonesian listings matching `query`, case-insensitively.
    ///
    /// The query is trimmed and must be 1 to 50 characters.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        let len = query.chars().count();
        if len == 0 || len > MAX_QUERY_LEN {
            return Err(AppError::BadRequest(format!(
                "query must be 1 to {} characters",
                MAX_QUERY_LEN
            )));
        }

        let stocks = self.matches_for(&query.to_uppercase()).await?;
        Ok(SearchResults {
            query: query.to_string(),
            total_results: stocks.len(),
            stocks,
        })
    }

    /// Resolve a ticker to its primary upstream code.
    pub async fn stock_info(&self, symbol: &str) -> Result<StockLookup> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || symbol.chars().count() > MAX_QUERY_LEN {
            return Err(AppError::BadRequest(format!(
                "symbol must be 1 to {} characters",
                MAX_QUERY_LEN
            )));
        }

        let all_matches = self.matches_for(&symbol).await?;
        let stock_info = all_matches
            .first()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No Indonesian stock found for symbol '{}'", symbol)))?;

        info!("Resolved {} to code {}", symbol, stock_info.code);
        Ok(StockLookup {
            primary_code: stock_info.code.clone(),
            symbol,
            stock_info,
            all_matches,
        })
    }

    async fn matches_for(&self, key: &str) -> Result<Vec<StockInfo>> {
        if let Some(cached) = self.matches.get(key) {
            debug!("Search cache hit for {}", key);
            return Ok(cached);
        }

        let stocks = self.provider.search(key).await?;
        self.matches.insert(key.to_string(), stocks.clone());
        Ok(stocks)
    }
}
