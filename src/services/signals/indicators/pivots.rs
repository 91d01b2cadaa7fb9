//! Pivot high/low detection.

use crate::types::{PivotPoint, PriceSeries, PricePoint};

/// Default neighbours on each side.
pub const DEFAULT_PIVOT_WINDOW: usize = 2;

/// Bars whose low is strictly below the lows of the `window` bars on each side.
///
/// Ties disqualify, so flat bottoms produce no pivots. Bars closer than
/// `window` to either end of the scanned range cannot be confirmed and are
/// skipped. `lookback` restricts the scan to the last N bars.
pub fn pivot_lows(series: &PriceSeries, window: usize, lookback: Option<usize>) -> Vec<PivotPoint> {
    find_pivots(scan_range(series, lookback), window, |p| p.low, |candidate, other| candidate < other)
}

/// Bars whose high is strictly above the highs of the `window` bars on each side.
pub fn pivot_highs(series: &PriceSeries, window: usize, lookback: Option<usize>) -> Vec<PivotPoint> {
    find_pivots(scan_range(series, lookback), window, |p| p.high, |candidate, other| candidate > other)
}

fn scan_range(series: &PriceSeries, lookback: Option<usize>) -> &[PricePoint] {
    let points = series.points();
    match lookback {
        Some(n) if n < points.len() => &points[points.len() - n..],
        _ => points,
    }
}

fn find_pivots(
    points: &[PricePoint],
    window: usize,
    value: impl Fn(&PricePoint) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<PivotPoint> {
    if window == 0 || points.len() < 2 * window + 1 {
        return Vec::new();
    }

    (window..points.len() - window)
        .filter(|&i| {
            let candidate = value(&points[i]);
            (i - window..=i + window)
                .filter(|&j| j != i)
                .all(|j| beats(candidate, value(&points[j])))
        })
        .map(|i| PivotPoint {
            date: points[i].date,
            price: value(&points[i]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::normalize;
    use crate::types::RawPriceRecord;

    fn series_from_lows(lows: &[f64]) -> PriceSeries {
        let records: Vec<RawPriceRecord> = lows
            .iter()
            .enumerate()
            .map(|(i, &low)| {
                let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                // high mirrors low around 100 so highs peak where lows dip
                let high = 200.0 - low;
                RawPriceRecord::new(date.to_string(), low, high, low, low, 1000.0)
            })
            .collect();
        normalize(&records).unwrap()
    }

    #[test]
    fn test_single_pivot_low() {
        let series = series_from_lows(&[10.0, 9.0, 8.0, 9.0, 10.0]);
        let pivots = pivot_lows(&series, 2, None);
        assert_eq!(pivots.len(), 1);
        assert_eq!(pivots[0].price, 8.0);
        assert_eq!(pivots[0].date.to_string(), "2024-01-03");
    }

    #[test]
    fn test_pivot_high_symmetric() {
        let series = series_from_lows(&[10.0, 9.0, 8.0, 9.0, 10.0]);
        let pivots = pivot_highs(&series, 2, None);
        assert_eq!(pivots.len(), 1);
        assert_eq!(pivots[0].price, 192.0);
    }

    #[test]
    fn test_ties_do_not_qualify() {
        // Flat bottom: 8.0 twice
        let series = series_from_lows(&[10.0, 9.0, 8.0, 8.0, 9.0, 10.0]);
        assert!(pivot_lows(&series, 2, None).is_empty());

        // Equal neighbour at the window edge also disqualifies
        let series = series_from_lows(&[8.0, 9.0, 8.0, 9.0, 10.0]);
        assert!(pivot_lows(&series, 2, None).is_empty());
    }

    #[test]
    fn test_edges_are_not_pivots() {
        let series = series_from_lows(&[5.0, 9.0, 10.0, 9.0, 5.0]);
        assert!(pivot_lows(&series, 2, None).is_empty());
    }

    #[test]
    fn test_multiple_pivots_in_order() {
        let series = series_from_lows(&[
            10.0, 9.0, 7.0, 9.0, 10.0, 11.0, 9.5, 7.1, 9.5, 11.0,
        ]);
        let prices: Vec<f64> = pivot_lows(&series, 2, None).iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![7.0, 7.1]);
    }

    #[test]
    fn test_lookback_limits_scan() {
        let series = series_from_lows(&[
            10.0, 9.0, 7.0, 9.0, 10.0, 11.0, 9.5, 7.1, 9.5, 11.0,
        ]);
        let prices: Vec<f64> = pivot_lows(&series, 2, Some(5)).iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![7.1]);
    }

    #[test]
    fn test_short_series_has_no_pivots() {
        let series = series_from_lows(&[10.0, 9.0, 10.0]);
        assert!(pivot_lows(&series, 2, None).is_empty());
        assert_eq!(pivot_lows(&series, 1, None).len(), 1);
    }
}
