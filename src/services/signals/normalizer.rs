//! Raw OHLCV feed to canonical [`PriceSeries`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::error::InvalidSeriesError;
use crate::types::{PricePoint, PriceSeries, RawPriceRecord};

/// Largest fraction of records that may be dropped for bad numbers before
/// the feed is considered broken upstream.
pub const MAX_DROP_RATE: f64 = 0.10;

/// Minimum points a canonical series holds.
pub const MIN_SERIES_LEN: usize = 2;

/// Validate, deduplicate and sort raw records into a [`PriceSeries`].
///
/// Records are taken in receipt order: on duplicate dates the later record
/// wins. Records with negative or non-finite numbers are dropped; any other
/// defect rejects the whole feed.
pub fn normalize(records: &[RawPriceRecord]) -> Result<PriceSeries, InvalidSeriesError> {
    let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let point = PricePoint {
            date: parse_date(&record.date)?,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };

        if !point.has_valid_numbers() {
            dropped += 1;
            continue;
        }
        if !point.has_valid_ohlc() {
            return Err(InvalidSeriesError::OhlcViolation { date: point.date });
        }

        by_date.insert(point.date, point);
    }

    if !records.is_empty() && dropped as f64 / records.len() as f64 > MAX_DROP_RATE {
        return Err(InvalidSeriesError::ExcessiveDropRate {
            dropped,
            total: records.len(),
        });
    }

    if by_date.len() < MIN_SERIES_LEN {
        return Err(InvalidSeriesError::TooFewPoints {
            count: by_date.len(),
        });
    }

    if dropped > 0 {
        debug!("Dropped {} of {} records with invalid numbers", dropped, records.len());
    }

    Ok(PriceSeries::from_sorted(by_date.into_values().collect()))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC calendar day).
fn parse_date(value: &str) -> Result<NaiveDate, InvalidSeriesError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.naive_utc().date()))
        .map_err(|_| InvalidSeriesError::UnparseableDate {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, close: f64) -> RawPriceRecord {
        RawPriceRecord::new(date, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    fn month(days: u32) -> Vec<RawPriceRecord> {
        (1..=days)
            .map(|d| record(&format!("2024-03-{:02}", d), 100.0 + d as f64))
            .collect()
    }

    #[test]
    fn test_sorts_ascending() {
        let records = vec![
            record("2024-06-06", 4570.0),
            record("2024-06-04", 4500.0),
            record("2024-06-05", 4550.0),
        ];
        let series = normalize(&records).unwrap();
        let dates: Vec<String> = series.points().iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-04", "2024-06-05", "2024-06-06"]);
    }

    #[test]
    fn test_duplicate_date_keeps_later_record() {
        let records = vec![
            record("2024-06-05", 4500.0),
            record("2024-06-06", 4570.0),
            record("2024-06-05", 4555.0),
        ];
        let series = normalize(&records).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].close, 4555.0);
    }

    #[test]
    fn test_idempotent() {
        let mut records = month(20);
        records.reverse();
        records.push(record("2024-03-10", 42.0));

        let once = normalize(&records).unwrap();
        let twice = normalize(&once.to_raw()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_high_below_low_rejects_series() {
        let mut records = month(10);
        records[4] = RawPriceRecord::new("2024-03-05", 100.0, 95.0, 105.0, 100.0, 1000.0);
        let err = normalize(&records).unwrap_err();
        assert!(matches!(err, InvalidSeriesError::OhlcViolation { .. }));
    }

    #[test]
    fn test_unparseable_date_rejects_series() {
        let mut records = month(5);
        records.push(record("06/07/2024", 100.0));
        let err = normalize(&records).unwrap_err();
        assert_eq!(
            err,
            InvalidSeriesError::UnparseableDate {
                value: "06/07/2024".to_string()
            }
        );
    }

    #[test]
    fn test_rfc3339_date_accepted() {
        let records = vec![
            record("2024-06-05T00:00:00Z", 100.0),
            record("2024-06-06T00:00:00+00:00", 101.0),
        ];
        let series = normalize(&records).unwrap();
        assert_eq!(series.range().last.to_string(), "2024-06-06");
    }

    #[test]
    fn test_sparse_invalid_numbers_are_dropped() {
        let mut records = month(20);
        records[3].volume = -5.0;
        records[7].close = f64::NAN;
        // 2 of 20 = 10%, not above the limit
        let series = normalize(&records).unwrap();
        assert_eq!(series.len(), 18);
    }

    #[test]
    fn test_excessive_drop_rate_rejects_series() {
        let mut records = month(20);
        records[1].open = -1.0;
        records[2].high = f64::INFINITY;
        records[3].low = -0.5;
        let err = normalize(&records).unwrap_err();
        assert_eq!(
            err,
            InvalidSeriesError::ExcessiveDropRate {
                dropped: 3,
                total: 20
            }
        );
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            normalize(&[]).unwrap_err(),
            InvalidSeriesError::TooFewPoints { count: 0 }
        );
        let records = vec![record("2024-06-05", 1.0), record("2024-06-05", 2.0)];
        assert_eq!(
            normalize(&records).unwrap_err(),
            InvalidSeriesError::TooFewPoints { count: 1 }
        );
    }
}
