use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::SeriesRange;

/// A local price extremum found by pivot detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Indicator values as of the latest bar of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    /// Latest close.
    pub close: f64,
    pub sma50: f64,
    pub rsi14: f64,
    /// Latest volume over its rolling baseline. `None` when the baseline is zero.
    pub volume_ratio: Option<f64>,
    pub pivot_lows: Vec<PivotPoint>,
    pub pivot_highs: Vec<PivotPoint>,
}

/// Empirical evidence from an external backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSummary {
    /// Fraction of winning trades, 0.0 to 1.0.
    pub win_rate: f64,
    pub total_trades: u32,
}

impl BacktestSummary {
    pub fn new(win_rate: f64, total_trades: u32) -> Self {
        Self {
            win_rate,
            total_trades,
        }
    }

    /// Win rate is finite and within [0, 1].
    pub fn is_valid(&self) -> bool {
        self.win_rate.is_finite() && (0.0..=1.0).contains(&self.win_rate)
    }
}

/// One boolean contributor to the confluence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    /// Close above the trend SMA.
    Trend,
    /// RSI below the oversold-leaning cutoff.
    Momentum,
    /// Volume well above its baseline.
    VolumeSpike,
    /// Repeated pivot lows near the current close.
    SupportCluster,
    /// Backtest win rate and sample size both convincing.
    EmpiricalBonus,
}

impl SignalKind {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Trend => "Trend",
            SignalKind::Momentum => "Momentum",
            SignalKind::VolumeSpike => "Volume Spike",
            SignalKind::SupportCluster => "Support Cluster",
            SignalKind::EmpiricalBonus => "Empirical Bonus",
        }
    }
}

/// Discrete recommendation derived from score and win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationTier {
    Strong,
    Partial,
    Avoid,
}

impl RecommendationTier {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationTier::Strong => "Strong",
            RecommendationTier::Partial => "Partial",
            RecommendationTier::Avoid => "Avoid",
        }
    }
}

/// Output of the confluence scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceResult {
    /// Number of triggered signals, 0 to 5.
    pub score: u8,
    pub triggered_signals: BTreeSet<SignalKind>,
    pub tier: RecommendationTier,
    pub as_of_date: NaiveDate,
}

/// A group of pivot lows sharing roughly the same price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportCluster {
    /// First (lowest) member; all membership checks compare against it.
    pub reference: f64,
    pub members: Vec<f64>,
}

impl SupportCluster {
    /// Mean price of the members.
    pub fn level(&self) -> f64 {
        self.members.iter().sum::<f64>() / self.members.len() as f64
    }

    pub fn strength(&self) -> usize {
        self.members.len()
    }
}

/// Caller-facing result of one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub snapshot: IndicatorSnapshot,
    pub result: ConfluenceResult,
    pub support_clusters: Vec<SupportCluster>,
    pub generated_at: DateTime<Utc>,
    pub source_series_range: SeriesRange,
}
