//! Relative Strength Index (RSI) indicator.

use crate::error::{ArithmeticDegenerateError, InsufficientDataError, SignalResult};
use crate::types::PriceSeries;

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI with Wilder smoothing, as of the latest bar.
///
/// The first average gain/loss is the simple mean of the first `period`
/// close-to-close changes; every later change is folded in with
/// `avg = (avg * (period - 1) + x) / period`. Values range 0-100, and a
/// window with no losses is exactly 100.
pub fn rsi(series: &PriceSeries, period: usize) -> SignalResult<f64> {
    if period == 0 {
        return Err(ArithmeticDegenerateError::ZeroPeriod { indicator: "RSI" }.into());
    }
    if series.len() < period + 1 {
        return Err(InsufficientDataError {
            indicator: "RSI",
            required: period + 1,
            available: series.len(),
        }
        .into());
    }

    let points = series.points();
    let mut gains = Vec::with_capacity(points.len() - 1);
    let mut losses = Vec::with_capacity(points.len() - 1);

    for i in 1..points.len() {
        let change = points[i].close - points[i - 1].close;
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = avg_gain / avg_loss;
    Ok((100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0))
}
