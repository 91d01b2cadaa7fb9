//! Technical indicator implementations.
//!
//! Every function here is pure over a normalized [`PriceSeries`] and fails
//! with [`crate::error::InsufficientDataError`] when the series is shorter
//! than its window.

pub mod pivots;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use pivots::{pivot_highs, pivot_lows};
pub use rsi::rsi;
pub use sma::{latest_sma, sma};
pub use volume::{volume_baseline, volume_ratio};

use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::{SignalError, SignalResult};
use crate::types::{IndicatorSnapshot, PriceSeries};

/// Compute every indicator the scorer needs as of the latest bar.
///
/// Missing history for SMA, RSI or the volume baseline is an error. A zero
/// volume baseline only leaves `volume_ratio` empty.
pub fn snapshot(series: &PriceSeries, config: &ScoringConfig) -> SignalResult<IndicatorSnapshot> {
    let sma50 = latest_sma(series, config.sma_period)?;
    let rsi14 = rsi(series, config.rsi_period)?;

    let volume_ratio = match volume_ratio(series, config.volume_period) {
        Ok(ratio) => Some(ratio),
        Err(SignalError::ArithmeticDegenerate(reason)) => {
            debug!("Volume ratio unavailable: {}", reason);
            None
        }
        Err(other) => return Err(other),
    };

    Ok(IndicatorSnapshot {
        close: series.latest().close,
        sma50,
        rsi14,
        volume_ratio,
        pivot_lows: pivot_lows(series, config.pivot_window, config.pivot_lookback),
        pivot_highs: pivot_highs(series, config.pivot_window, config.pivot_lookback),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsufficientDataError;
    use crate::services::signals::normalize;
    use crate::types::RawPriceRecord;

    fn flat_series(count: usize, volume: f64) -> PriceSeries {
        let records: Vec<RawPriceRecord> = (0..count)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                RawPriceRecord::new(date.to_string(), 100.0, 101.0, 99.0, 100.0, volume)
            })
            .collect();
        normalize(&records).unwrap()
    }

    #[test]
    fn test_snapshot_flat_series() {
        let snap = snapshot(&flat_series(60, 1000.0), &ScoringConfig::default()).unwrap();
        assert_eq!(snap.close, 100.0);
        assert!((snap.sma50 - 100.0).abs() < 1e-9);
        assert_eq!(snap.rsi14, 100.0);
        assert_eq!(snap.volume_ratio, Some(1.0));
        assert!(snap.pivot_lows.is_empty());
        assert!(snap.pivot_highs.is_empty());
    }

    #[test]
    fn test_snapshot_zero_volume_downgrades() {
        let snap = snapshot(&flat_series(60, 0.0), &ScoringConfig::default()).unwrap();
        assert_eq!(snap.volume_ratio, None);
    }

    #[test]
    fn test_snapshot_needs_sma_history() {
        let err = snapshot(&flat_series(49, 1000.0), &ScoringConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SignalError::InsufficientData(InsufficientDataError { required: 50, .. })
        ));
    }
}
