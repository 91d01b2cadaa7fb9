//! Rolling volume baseline and volume ratio.

use crate::error::{ArithmeticDegenerateError, InsufficientDataError, SignalResult};
use crate::types::PriceSeries;

/// Default volume baseline lookback.
pub const DEFAULT_VOLUME_PERIOD: usize = 20;

/// Mean volume over the trailing `period` bars, latest bar included.
pub fn volume_baseline(series: &PriceSeries, period: usize) -> SignalResult<f64> {
    if period == 0 {
        return Err(ArithmeticDegenerateError::ZeroPeriod {
            indicator: "Volume baseline",
        }
        .into());
    }
    if series.len() < period {
        return Err(InsufficientDataError {
            indicator: "Volume baseline",
            required: period,
            available: series.len(),
        }
        .into());
    }

    let total: f64 = series.points().iter().rev().take(period).map(|p| p.volume).sum();
    Ok(total / period as f64)
}

/// Latest volume divided by its baseline.
///
/// Undefined for a zero baseline, which happens on instruments that did not
/// trade at all during the window.
pub fn volume_ratio(series: &PriceSeries, period: usize) -> SignalResult<f64> {
    let baseline = volume_baseline(series, period)?;
    if baseline == 0.0 {
        return Err(ArithmeticDegenerateError::ZeroVolumeBaseline { period }.into());
    }
    Ok(series.latest().volume / baseline)
}
