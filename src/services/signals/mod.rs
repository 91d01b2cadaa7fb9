//! Confluence signal engine.
//!
//! Turns raw daily bars into a scored [`SignalReport`]: normalize, compute
//! indicators, cluster pivot lows into support levels, then aggregate the
//! boolean signals into a score and tier.

pub mod clusters;
pub mod indicators;
pub mod normalizer;
pub mod report;
pub mod scorer;

pub use clusters::{cluster_prices, detect_support, SupportAnalysis};
pub use normalizer::normalize;
pub use report::{build_report, Clock, FixedClock, SystemClock};
pub use scorer::ConfluenceScorer;

use std::sync::Arc;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::SignalResult;
use crate::types::{BacktestSummary, PriceSeries, RawPriceRecord, SignalReport};

/// Pure scoring pipeline with an injectable clock.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct SignalEngine {
    scorer: ConfluenceScorer,
    clock: Arc<dyn Clock>,
}

impl SignalEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ScoringConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorer: ConfluenceScorer::new(config),
            clock,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    /// Score a normalized series as of its latest bar.
    pub fn score(
        &self,
        series: &PriceSeries,
        backtest: Option<&BacktestSummary>,
    ) -> SignalResult<SignalReport> {
        let cfg = self.config();
        let snapshot = indicators::snapshot(series, cfg)?;
        let support = detect_support(
            &snapshot.pivot_lows,
            snapshot.close,
            cfg.cluster_tolerance,
            cfg.min_cluster_members,
            cfg.support_pivot_count,
        );
        let result = self
            .scorer
            .score(&snapshot, &support, backtest, series.latest().date);

        debug!(
            "Scored {} bars as of {}: score={} tier={}",
            series.len(),
            result.as_of_date,
            result.score,
            result.tier.label()
        );

        Ok(build_report(
            series,
            snapshot,
            result,
            support.clusters,
            self.clock.as_ref(),
        ))
    }

    /// Normalize then score.
    pub fn score_records(
        &self,
        records: &[RawPriceRecord],
        backtest: Option<&BacktestSummary>,
    ) -> SignalResult<SignalReport> {
        let series = normalize(records)?;
        self.score(&series, backtest)
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl std::fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalEngine")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
