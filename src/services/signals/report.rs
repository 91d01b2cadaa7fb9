//! Final report assembly.

use chrono::{DateTime, Utc};

use crate::types::{ConfluenceResult, IndicatorSnapshot, PriceSeries, SignalReport, SupportCluster};

/// Source of the report timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn build_report(
    series: &PriceSeries,
    snapshot: IndicatorSnapshot,
    result: ConfluenceResult,
    support_clusters: Vec<SupportCluster>,
    clock: &dyn Clock,
) -> SignalReport {
    SignalReport {
        snapshot,
        result,
        support_clusters,
        generated_at: clock.now(),
        source_series_range: series.range(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::normalize;
    use crate::types::{RawPriceRecord, RecommendationTier};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    #[test]
    fn test_build_report_uses_clock_and_range() {
        let series = normalize(&[
            RawPriceRecord::new("2024-06-05", 4500.0, 4560.0, 4480.0, 4550.0, 72_000_000.0),
            RawPriceRecord::new("2024-06-06", 4550.0, 4580.0, 4530.0, 4570.0, 85_000_000.0),
        ])
        .unwrap();
        let snapshot = IndicatorSnapshot {
            close: 4570.0,
            sma50: 4400.0,
            rsi14: 60.0,
            volume_ratio: None,
            pivot_lows: Vec::new(),
            pivot_highs: Vec::new(),
        };
        let result = ConfluenceResult {
            score: 1,
            triggered_signals: BTreeSet::new(),
            tier: RecommendationTier::Avoid,
            as_of_date: series.latest().date,
        };
        let at = Utc.with_ymd_and_hms(2024, 6, 7, 9, 0, 0).unwrap();

        let report = build_report(&series, snapshot.clone(), result.clone(), Vec::new(), &FixedClock(at));
        assert_eq!(report.generated_at, at);
        assert_eq!(report.source_series_range, series.range());
        assert_eq!(report.snapshot, snapshot);
        assert_eq!(report.result, result);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let series = normalize(&[
            RawPriceRecord::new("2024-06-05", 10.0, 11.0, 9.0, 10.0, 1.0),
            RawPriceRecord::new("2024-06-06", 10.0, 11.0, 9.0, 10.0, 1.0),
        ])
        .unwrap();
        let report = build_report(
            &series,
            IndicatorSnapshot {
                close: 10.0,
                sma50: 10.0,
                rsi14: 100.0,
                volume_ratio: Some(1.0),
                pivot_lows: Vec::new(),
                pivot_highs: Vec::new(),
            },
            ConfluenceResult {
                score: 0,
                triggered_signals: BTreeSet::new(),
                tier: RecommendationTier::Avoid,
                as_of_date: series.latest().date,
            },
            Vec::new(),
            &SystemClock,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["result"]["tier"], "AVOID");
        assert_eq!(json["sourceSeriesRange"]["first"], "2024-06-05");
        assert_eq!(json["snapshot"]["volumeRatio"], 1.0);
    }
}
