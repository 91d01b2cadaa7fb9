//! Simple Moving Average (SMA) indicator.

use crate::error::{ArithmeticDegenerateError, InsufficientDataError, SignalResult};
use crate::types::PriceSeries;

/// Trailing SMA of closes.
///
/// Element `i` is the mean of closes `i..i + period`, so the result has
/// `len - period + 1` values and the last one is the SMA as of the latest bar.
pub fn sma(series: &PriceSeries, period: usize) -> SignalResult<Vec<f64>> {
    if period == 0 {
        return Err(ArithmeticDegenerateError::ZeroPeriod { indicator: "SMA" }.into());
    }
    if series.len() < period {
        return Err(InsufficientDataError {
            indicator: "SMA",
            required: period,
            available: series.len(),
        }
        .into());
    }

    let closes: Vec<f64> = series.closes().collect();
    let mut values = Vec::with_capacity(closes.len() - period + 1);
    let mut window_sum: f64 = closes.iter().take(period).sum();
    values.push(window_sum / period as f64);

    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        values.push(window_sum / period as f64);
    }

    Ok(values)
}

/// SMA as of the latest bar.
pub fn latest_sma(series: &PriceSeries, period: usize) -> SignalResult<f64> {
    if period == 0 {
        return Err(ArithmeticDegenerateError::ZeroPeriod { indicator: "SMA" }.into());
    }
    if series.len() < period {
        return Err(InsufficientDataError {
            indicator: "SMA",
            required: period,
            available: series.len(),
        }
        .into());
    }

    // Summed directly rather than via the rolling sum to avoid drift
    let sum: f64 = series.points().iter().rev().take(period).map(|p| p.close).sum();
    Ok(sum / period as f64)
}
