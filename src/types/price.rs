use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One OHLCV record exactly as a provider delivered it.
///
/// Nothing is validated yet; dates are still text and numbers may be
/// negative or non-finite. Only [`crate::services::signals::normalize`] turns
/// these into a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPriceRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawPriceRecord {
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl From<&PricePoint> for RawPriceRecord {
    fn from(point: &PricePoint) -> Self {
        Self {
            date: point.date.format("%Y-%m-%d").to_string(),
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            volume: point.volume,
        }
    }
}

/// A validated daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// All numeric fields are finite and non-negative.
    pub fn has_valid_numbers(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// high >= low and the body sits inside the wicks.
    pub fn has_valid_ohlc(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

/// First and last calendar day covered by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// Canonical price history: strictly ascending dates, no duplicates, at
/// least two points.
///
/// The constructor is crate-private so every instance has gone through the
/// normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub(crate) fn from_sorted(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.len() >= 2);
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent bar.
    pub fn latest(&self) -> &PricePoint {
        // Non-empty by construction
        &self.points[self.points.len() - 1]
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn range(&self) -> SeriesRange {
        SeriesRange {
            first: self.points[0].date,
            last: self.latest().date,
        }
    }

    /// Round-trip back to provider records.
    pub fn to_raw(&self) -> Vec<RawPriceRecord> {
        self.points.iter().map(RawPriceRecord::from).collect()
    }
}
