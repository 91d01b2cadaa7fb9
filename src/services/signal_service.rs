//! Fetch, normalize, score and cache signal reports.

use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::{CacheStats, TtlCache};
use super::signals::{normalize, SignalEngine};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::sources::{BacktestProvider, PriceHistoryProvider};
use crate::types::{BulkSignals, BulkSummary, HistoryRequest, PriceSeries, SignalReport};

/// Wires upstream providers to the scoring engine.
pub struct SignalService {
    history: Arc<dyn PriceHistoryProvider>,
    backtests: Arc<dyn BacktestProvider>,
    engine: SignalEngine,
    reports: TtlCache<SignalReport>,
    max_bulk_codes: usize,
}

impl SignalService {
    pub fn new(
        history: Arc<dyn PriceHistoryProvider>,
        backtests: Arc<dyn BacktestProvider>,
        engine: SignalEngine,
        reports: TtlCache<SignalReport>,
        max_bulk_codes: usize,
    ) -> Self {
        Self {
            history,
            backtests,
            engine,
            reports,
            max_bulk_codes,
        }
    }

    pub fn from_config(
        config: &Config,
        history: Arc<dyn PriceHistoryProvider>,
        backtests: Arc<dyn BacktestProvider>,
    ) -> Self {
        Self::new(
            history,
            backtests,
            SignalEngine::new(config.scoring.clone()),
            TtlCache::from_config(config),
            config.max_bulk_codes,
        )
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.reports.stats()
    }

    /// Drop expired cached reports, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.reports.purge_expired()
    }

    pub fn max_bulk_codes(&self) -> usize {
        self.max_bulk_codes
    }

    /// Normalized price history for one instrument.
    pub async fn history(&self, request: &HistoryRequest) -> Result<PriceSeries> {
        let records = self.history.fetch_history(request).await?;
        debug!("Fetched {} raw records for {}", records.len(), request.code);
        normalize(&records).map_err(|e| AppError::Signal(e.into()))
    }

    /// Score one instrument, serving from cache when fresh.
    pub async fn signal(&self, request: &HistoryRequest) -> Result<SignalReport> {
        let key = request.cache_key();
        if let Some(report) = self.reports.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(report);
        }

        let series = self.history(request).await?;
        let backtest = match self.backtests.summary(&request.code).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Backtest lookup for {} failed, scoring without it: {}", request.code, e);
                None
            }
        };

        let report = self.engine.score(&series, backtest.as_ref())?;
        info!(
            "Scored {}: {} ({}/5)",
            request.code,
            report.result.tier.label(),
            report.result.score
        );

        self.reports.insert(key, report.clone());
        Ok(report)
    }

    /// Score several instruments over the same window concurrently.
    ///
    /// Codes are trimmed and de-duplicated. One failing code never fails the
    /// batch; its error message is reported under `errors`.
    pub async fn bulk_signals(&self, codes: &[String], template: &HistoryRequest) -> Result<BulkSignals> {
        let mut unique: Vec<&str> = Vec::new();
        for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }

        if unique.is_empty() {
            return Err(AppError::BadRequest("At least one stock code is required".to_string()));
        }
        if unique.len() > self.max_bulk_codes {
            return Err(AppError::BadRequest(format!(
                "Maximum {} stocks allowed per request",
                self.max_bulk_codes
            )));
        }

        let requests: Vec<HistoryRequest> = unique.iter().map(|code| template.for_code(code)).collect();
        let outcomes = join_all(requests.iter().map(|req| self.signal(req))).await;

        let mut successful = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (req, outcome) in requests.into_iter().zip(outcomes) {
            match outcome {
                Ok(report) => {
                    successful.insert(req.code, report);
                }
                Err(e) => {
                    warn!("Bulk scoring failed for {}: {}", req.code, e);
                    errors.insert(req.code, e.to_string());
                }
            }
        }

        let summary = BulkSummary {
            total_requested: unique.len(),
            successful: successful.len(),
            failed: errors.len(),
        };
        info!(
            "Bulk scoring completed: {}/{} successful",
            summary.successful, summary.total_requested
        );

        Ok(BulkSignals {
            successful,
            errors,
            summary,
        })
    }
}
