//! Rule aggregation from indicator snapshot to score and tier.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::config::ScoringConfig;
use crate::types::{BacktestSummary, ConfluenceResult, IndicatorSnapshot, RecommendationTier, SignalKind};

use super::clusters::SupportAnalysis;

/// Combines independent boolean signals into a confluence score.
///
/// Holds no state besides its thresholds; one instance can score any number
/// of instruments concurrently.
#[derive(Debug, Clone, Default)]
pub struct ConfluenceScorer {
    config: ScoringConfig,
}

impl ConfluenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one snapshot.
    ///
    /// An absent or out-of-range backtest never fails scoring: the empirical
    /// bonus just stays off and the tier is computed with a win rate of 0.
    pub fn score(
        &self,
        snapshot: &IndicatorSnapshot,
        support: &SupportAnalysis,
        backtest: Option<&BacktestSummary>,
        as_of_date: NaiveDate,
    ) -> ConfluenceResult {
        let backtest = backtest.filter(|b| b.is_valid());
        let cfg = &self.config;
        let mut triggered = BTreeSet::new();

        if snapshot.close > snapshot.sma50 {
            triggered.insert(SignalKind::Trend);
        }
        if snapshot.rsi14 < cfg.rsi_threshold {
            triggered.insert(SignalKind::Momentum);
        }
        if snapshot
            .volume_ratio
            .is_some_and(|ratio| ratio > cfg.volume_spike_ratio)
        {
            triggered.insert(SignalKind::VolumeSpike);
        }
        if support.near_close >= 1 {
            triggered.insert(SignalKind::SupportCluster);
        }
        if backtest.is_some_and(|b| {
            b.win_rate > cfg.bonus_win_rate && b.total_trades >= cfg.bonus_min_trades
        }) {
            triggered.insert(SignalKind::EmpiricalBonus);
        }

        let score = triggered.len() as u8;
        let win_rate = backtest.map(|b| b.win_rate).unwrap_or(0.0);

        ConfluenceResult {
            score,
            triggered_signals: triggered,
            tier: self.tier(score, win_rate),
            as_of_date,
        }
    }

    /// Tier from score and win rate, rules checked in priority order.
    ///
    /// Combinations none of the three rules claim (for example a win rate of
    /// 0.60 with score 4, or 0.70 with score 2) resolve to PARTIAL so the
    /// tier never drops when either input improves.
    pub fn tier(&self, score: u8, win_rate: f64) -> RecommendationTier {
        let cfg = &self.config;
        let partial_band = win_rate >= cfg.partial_win_rate && win_rate < cfg.strong_win_rate;

        if win_rate >= cfg.strong_win_rate && score >= cfg.strong_min_score {
            RecommendationTier::Strong
        } else if partial_band && (cfg.partial_min_score..=cfg.partial_max_score).contains(&score) {
            RecommendationTier::Partial
        } else if win_rate < cfg.partial_win_rate || score < cfg.partial_min_score {
            RecommendationTier::Avoid
        } else {
            RecommendationTier::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PivotPoint, SupportCluster};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 6).unwrap()
    }

    fn quiet_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 100.0,
            sma50: 105.0,
            rsi14: 55.0,
            volume_ratio: Some(1.0),
            pivot_lows: Vec::new(),
            pivot_highs: Vec::new(),
        }
    }

    fn no_support() -> SupportAnalysis {
        SupportAnalysis {
            clusters: Vec::new(),
            near_close: 0,
        }
    }

    fn one_cluster() -> SupportAnalysis {
        SupportAnalysis {
            clusters: vec![SupportCluster {
                reference: 99.0,
                members: vec![99.0, 99.5],
            }],
            near_close: 1,
        }
    }

    #[test]
    fn test_full_confluence_is_strong() {
        let snapshot = IndicatorSnapshot {
            close: 100.0,
            sma50: 95.0,
            rsi14: 35.0,
            volume_ratio: Some(1.5),
            pivot_lows: vec![
                PivotPoint { date: as_of(), price: 99.0 },
                PivotPoint { date: as_of(), price: 99.5 },
            ],
            pivot_highs: Vec::new(),
        };
        let backtest = BacktestSummary::new(0.70, 12);
        let result = ConfluenceScorer::default().score(&snapshot, &one_cluster(), Some(&backtest), as_of());
        assert_eq!(result.score, 5);
        assert_eq!(result.tier, RecommendationTier::Strong);
        assert_eq!(result.triggered_signals.len(), 5);
        assert_eq!(result.as_of_date, as_of());
    }

    #[test]
    fn test_absent_backtest_forces_avoid() {
        let snapshot = IndicatorSnapshot {
            close: 100.0,
            sma50: 95.0,
            rsi14: 35.0,
            volume_ratio: Some(1.5),
            ..quiet_snapshot()
        };
        let result = ConfluenceScorer::default().score(&snapshot, &one_cluster(), None, as_of());
        assert_eq!(result.score, 4);
        assert!(!result.triggered_signals.contains(&SignalKind::EmpiricalBonus));
        assert_eq!(result.tier, RecommendationTier::Avoid);
    }

    #[test]
    fn test_quiet_snapshot_scores_zero() {
        let result = ConfluenceScorer::default().score(&quiet_snapshot(), &no_support(), None, as_of());
        assert_eq!(result.score, 0);
        assert!(result.triggered_signals.is_empty());
        assert_eq!(result.tier, RecommendationTier::Avoid);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let scorer = ConfluenceScorer::default();
        let snapshot = IndicatorSnapshot {
            close: 100.0,
            sma50: 100.0,
            rsi14: 40.0,
            volume_ratio: Some(1.3),
            ..quiet_snapshot()
        };
        let result = scorer.score(&snapshot, &no_support(), None, as_of());
        assert_eq!(result.score, 0);

        // Exactly 0.65 is not enough for the bonus
        let backtest = BacktestSummary::new(0.65, 50);
        let result = scorer.score(&quiet_snapshot(), &no_support(), Some(&backtest), as_of());
        assert!(!result.triggered_signals.contains(&SignalKind::EmpiricalBonus));
    }

    #[test]
    fn test_bonus_needs_enough_trades() {
        let scorer = ConfluenceScorer::default();
        let thin = BacktestSummary::new(0.9, 9);
        let result = scorer.score(&quiet_snapshot(), &no_support(), Some(&thin), as_of());
        assert_eq!(result.score, 0);

        let enough = BacktestSummary::new(0.9, 10);
        let result = scorer.score(&quiet_snapshot(), &no_support(), Some(&enough), as_of());
        assert_eq!(result.score, 1);
        assert!(result.triggered_signals.contains(&SignalKind::EmpiricalBonus));
    }

    #[test]
    fn test_missing_volume_ratio_not_triggered() {
        let snapshot = IndicatorSnapshot {
            volume_ratio: None,
            ..quiet_snapshot()
        };
        let result = ConfluenceScorer::default().score(&snapshot, &no_support(), None, as_of());
        assert!(!result.triggered_signals.contains(&SignalKind::VolumeSpike));
    }

    #[test]
    fn test_invalid_backtest_treated_as_absent() {
        let bogus = BacktestSummary::new(7.0, 100);
        let result = ConfluenceScorer::default().score(&quiet_snapshot(), &no_support(), Some(&bogus), as_of());
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, RecommendationTier::Avoid);
    }

    #[test]
    fn test_tier_rules() {
        let scorer = ConfluenceScorer::default();
        assert_eq!(scorer.tier(3, 0.65), RecommendationTier::Strong);
        assert_eq!(scorer.tier(5, 0.90), RecommendationTier::Strong);
        assert_eq!(scorer.tier(2, 0.55), RecommendationTier::Partial);
        assert_eq!(scorer.tier(3, 0.64), RecommendationTier::Partial);
        assert_eq!(scorer.tier(5, 0.54), RecommendationTier::Avoid);
        assert_eq!(scorer.tier(1, 0.90), RecommendationTier::Avoid);
        assert_eq!(scorer.tier(4, 0.0), RecommendationTier::Avoid);
    }

    #[test]
    fn test_tier_unclaimed_combinations_resolve_partial() {
        let scorer = ConfluenceScorer::default();
        assert_eq!(scorer.tier(4, 0.60), RecommendationTier::Partial);
        assert_eq!(scorer.tier(2, 0.70), RecommendationTier::Partial);
    }

    #[test]
    fn test_tier_never_drops_when_inputs_improve() {
        fn rank(tier: RecommendationTier) -> u8 {
            match tier {
                RecommendationTier::Avoid => 0,
                RecommendationTier::Partial => 1,
                RecommendationTier::Strong => 2,
            }
        }

        let scorer = ConfluenceScorer::default();
        for score in 0..5u8 {
            for step in 0..100 {
                let win_rate = step as f64 / 100.0;
                let here = rank(scorer.tier(score, win_rate));
                assert!(rank(scorer.tier(score + 1, win_rate)) >= here);
                assert!(rank(scorer.tier(score, win_rate + 0.01)) >= here);
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let scorer = ConfluenceScorer::new(ScoringConfig {
            rsi_threshold: 30.0,
            volume_spike_ratio: 2.0,
            ..ScoringConfig::default()
        });
        let snapshot = IndicatorSnapshot {
            rsi14: 35.0,
            volume_ratio: Some(1.5),
            ..quiet_snapshot()
        };
        let result = scorer.score(&snapshot, &no_support(), None, as_of());
        assert_eq!(result.score, 0);
    }
}
